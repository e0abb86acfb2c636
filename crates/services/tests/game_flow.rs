use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Notify;

use services::{
    Explainer, GameError, GameService, GenerationSource, SupplyConfig, SupplyError,
    SupplyPipeline,
};
use storage::InMemoryCorpus;
use swipe_core::model::{Answer, Gender, Item, ItemId, LanguageLevel, PlayerId};
use swipe_core::time::fixed_clock;
use swipe_core::{Advance, EngineConfig, GameState};

fn corpus_service(total_rounds: u32) -> GameService {
    let words = (1..=20).map(|n| {
        let gender = if n % 3 == 0 {
            Gender::Masculine
        } else {
            Gender::Feminine
        };
        Item::word(ItemId::new(n), format!("nom{n}"), gender, None).unwrap()
    });
    GameService::new(
        EngineConfig {
            total_rounds,
            require_level: false,
        },
        SupplyPipeline::corpus(Arc::new(InMemoryCorpus::with_items(words))),
    )
    .with_clock(fixed_clock())
}

fn player(name: &str) -> PlayerId {
    name.parse().unwrap()
}

#[tokio::test]
async fn perfect_game_runs_to_completion() {
    let svc = corpus_service(10);
    let ana = player("ana");
    let start = svc.start_game(ana.clone(), None).await.unwrap();
    assert_eq!(start.scoreboard.rounds_completed, 0);
    assert_eq!(start.scoreboard.level, Some(LanguageLevel::Beginner));

    let mut round = start.round;
    for answered in 1..=10 {
        let choice = round.item().key().correct_choice();
        let feedback = svc
            .submit_answer(&ana, Answer::new(round.id(), choice))
            .await
            .unwrap();
        assert!(feedback.is_correct);
        assert_eq!(feedback.correct_answer, round.item().key().correct());
        assert_eq!(svc.state(&ana).unwrap(), GameState::FeedbackShown);

        match svc.continue_game(&ana).unwrap() {
            Advance::Next(next) => {
                assert!(answered < 10);
                assert_eq!(Some(&next), feedback.next_round.as_ref());
                round = next;
            }
            Advance::Complete(board) => {
                assert_eq!(answered, 10);
                assert!(feedback.next_round.is_none());
                assert_eq!(board.score, 10);
                assert_eq!(board.accuracy, 100);
                assert!(board.game_complete);
            }
        }
    }
    assert_eq!(svc.state(&ana).unwrap(), GameState::Complete);

    let late = svc
        .submit_answer(&ana, Answer::new(round.id(), round.item().key().correct_choice()))
        .await
        .unwrap_err();
    assert!(late.is_stale_answer());
    assert_eq!(svc.scoreboard(&ana).unwrap().rounds_completed, 10);
}

#[tokio::test]
async fn replaying_an_answer_is_stale() {
    let svc = corpus_service(5);
    let ben = player("ben");
    let round = svc.start_game(ben.clone(), None).await.unwrap().round;
    let wrong = round.item().key().correct_choice().opposite();

    let feedback = svc
        .submit_answer(&ben, Answer::new(round.id(), wrong))
        .await
        .unwrap();
    assert!(!feedback.is_correct);
    assert!(feedback.explanation.starts_with("Not quite."));

    let again = svc
        .submit_answer(&ben, Answer::new(round.id(), wrong))
        .await
        .unwrap_err();
    assert!(again.is_stale_answer());
    let board = svc.scoreboard(&ben).unwrap();
    assert_eq!((board.score, board.rounds_completed, board.accuracy), (0, 1, 0));
}

#[tokio::test]
async fn restart_keeps_the_level_and_resets_counters() {
    let svc = corpus_service(2);
    let cleo = player("cleo");
    svc.select_level(&cleo, LanguageLevel::Intermediate).unwrap();
    let mut round = svc.start_game(cleo.clone(), None).await.unwrap().round;
    loop {
        let choice = round.item().key().correct_choice();
        svc.submit_answer(&cleo, Answer::new(round.id(), choice))
            .await
            .unwrap();
        match svc.continue_game(&cleo).unwrap() {
            Advance::Next(next) => round = next,
            Advance::Complete(_) => break,
        }
    }

    let again = svc.restart(&cleo).await.unwrap();
    assert_eq!(again.scoreboard.score, 0);
    assert_eq!(again.scoreboard.rounds_completed, 0);
    assert!(!again.scoreboard.game_complete);
    assert_eq!(again.scoreboard.level, Some(LanguageLevel::Intermediate));
    assert_ne!(again.round.id(), round.id());
}

/// Blocks its first call until released; later calls answer at once.
struct GatedSource {
    calls: AtomicUsize,
    entered: Notify,
    release: Notify,
    text: String,
}

#[async_trait]
impl GenerationSource for GatedSource {
    async fn generate(&self, _prompt: &str) -> Result<String, SupplyError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            self.entered.notify_one();
            self.release.notified().await;
        }
        Ok(self.text.clone())
    }
}

#[tokio::test]
async fn older_start_is_superseded_by_a_newer_one() {
    let text = (0..15)
        .map(|i| format!(r#"{{"word": "mot{i}", "gender": "masculine"}}"#))
        .collect::<Vec<_>>()
        .join("\n");
    let source = Arc::new(GatedSource {
        calls: AtomicUsize::new(0),
        entered: Notify::new(),
        release: Notify::new(),
        text,
    });
    let svc = Arc::new(
        GameService::new(
            EngineConfig::default(),
            SupplyPipeline::live(source.clone(), SupplyConfig::default()),
        )
        .with_clock(fixed_clock()),
    );
    let dora = player("dora");

    let first = {
        let svc = Arc::clone(&svc);
        let dora = dora.clone();
        tokio::spawn(async move { svc.start_game(dora, None).await })
    };
    source.entered.notified().await;

    let second = svc.start_game(dora.clone(), None).await.unwrap();
    source.release.notify_one();

    let first = first.await.unwrap();
    assert!(matches!(first, Err(GameError::Superseded)));
    let current = svc.current_round(&dora).unwrap().unwrap();
    assert_eq!(current.id(), second.round.id());
}

#[tokio::test]
async fn level_is_locked_while_a_start_is_pending() {
    let text = (0..15)
        .map(|i| format!(r#"{{"word": "mot{i}", "gender": "feminine"}}"#))
        .collect::<Vec<_>>()
        .join("\n");
    let source = Arc::new(GatedSource {
        calls: AtomicUsize::new(0),
        entered: Notify::new(),
        release: Notify::new(),
        text,
    });
    let svc = Arc::new(
        GameService::new(
            EngineConfig::default(),
            SupplyPipeline::live(source.clone(), SupplyConfig::default()),
        )
        .with_clock(fixed_clock()),
    );
    let fay = player("fay");

    let start = {
        let svc = Arc::clone(&svc);
        let fay = fay.clone();
        tokio::spawn(async move {
            svc.start_game(fay, Some(LanguageLevel::Beginner)).await
        })
    };
    source.entered.notified().await;

    let err = svc
        .select_level(&fay, LanguageLevel::Advanced)
        .unwrap_err();
    assert!(matches!(err, GameError::StartPending));
    source.release.notify_one();

    let started = start.await.unwrap().unwrap();
    assert_eq!(started.scoreboard.level, Some(LanguageLevel::Beginner));
    assert_eq!(
        svc.scoreboard(&fay).unwrap().level,
        Some(LanguageLevel::Beginner)
    );
    assert!(matches!(
        svc.select_level(&fay, LanguageLevel::Advanced),
        Err(GameError::Engine(_))
    ));
}

#[tokio::test]
async fn supply_failure_surfaces_and_leaves_no_round() {
    let svc = GameService::new(
        EngineConfig::default(),
        SupplyPipeline::corpus(Arc::new(InMemoryCorpus::new())),
    );
    let eli = player("eli");
    let err = svc.start_game(eli.clone(), None).await.unwrap_err();
    assert!(matches!(
        err,
        GameError::Supply(SupplyError::Exhausted {
            produced: 0,
            required: 10
        })
    ));
    assert_eq!(svc.state(&eli).unwrap(), GameState::Ready);
    assert!(svc.current_round(&eli).unwrap().is_none());
}

struct FixedExplainer(Option<&'static str>);

#[async_trait]
impl Explainer for FixedExplainer {
    async fn explain(&self, _item: &Item, _is_correct: bool) -> Result<String, SupplyError> {
        self.0
            .map(str::to_string)
            .ok_or(SupplyError::EmptyResponse)
    }
}

#[tokio::test]
async fn explainer_text_replaces_the_built_in_one() {
    let svc = corpus_service(3).with_explainer(Arc::new(FixedExplainer(Some("Because."))));
    let fay = player("fay");
    let round = svc.start_game(fay.clone(), None).await.unwrap().round;
    let feedback = svc
        .submit_answer(&fay, Answer::new(round.id(), round.item().key().correct_choice()))
        .await
        .unwrap();
    assert_eq!(feedback.explanation, "Because.");
}

#[tokio::test]
async fn failing_explainer_keeps_the_built_in_text() {
    let svc = corpus_service(3).with_explainer(Arc::new(FixedExplainer(None)));
    let gus = player("gus");
    let round = svc.start_game(gus.clone(), None).await.unwrap().round;
    let feedback = svc
        .submit_answer(&gus, Answer::new(round.id(), round.item().key().correct_choice()))
        .await
        .unwrap();
    assert_eq!(
        feedback.explanation,
        round.item().explanation(true),
    );
}
