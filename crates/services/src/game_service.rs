use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info};

use swipe_core::model::{Answer, Feedback, LanguageLevel, PlayerId, Round};
use swipe_core::{Advance, Clock, EngineConfig, GameState, Scoreboard, Session};

use crate::error::GameError;
use crate::explain::Explainer;
use crate::supply::SupplyPipeline;

/// First round of a freshly started game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameStart {
    pub player_id: PlayerId,
    pub round: Round,
    pub scoreboard: Scoreboard,
}

struct PlayerSlot {
    /// Token of the latest start-game request for this player.
    token: u64,
    /// Set while that request waits for its pool.
    pending: bool,
    session: Session,
}

/// Hosts one session per player behind a lock.
///
/// The lock is never held while a pool or an explanation is being fetched.
/// A start-game request whose token was replaced in the meantime discards
/// its pool with `GameError::Superseded`.
pub struct GameService {
    clock: Clock,
    config: EngineConfig,
    supply: SupplyPipeline,
    explainer: Option<Arc<dyn Explainer>>,
    players: Mutex<HashMap<PlayerId, PlayerSlot>>,
    next_token: AtomicU64,
}

impl GameService {
    #[must_use]
    pub fn new(config: EngineConfig, supply: SupplyPipeline) -> Self {
        Self {
            clock: Clock::default(),
            config,
            supply,
            explainer: None,
            players: Mutex::new(HashMap::new()),
            next_token: AtomicU64::new(1),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_explainer(mut self, explainer: Arc<dyn Explainer>) -> Self {
        self.explainer = Some(explainer);
        self
    }

    /// Records a level for the player's next game, creating the session if needed.
    /// A finished game is reset first.
    ///
    /// # Errors
    ///
    /// Returns `GameError::StartPending` while a pool is being fetched for the
    /// player, and `GameError::Engine` while a game is under way.
    pub fn select_level(
        &self,
        player: &PlayerId,
        level: LanguageLevel,
    ) -> Result<Scoreboard, GameError> {
        let mut players = self.lock()?;
        if let Some(slot) = players.get_mut(player) {
            if slot.pending {
                return Err(GameError::StartPending);
            }
            if slot.session.is_complete() {
                slot.session.restart()?;
            }
            slot.session.select_level(level)?;
            return Ok(slot.session.scoreboard());
        }

        let mut session = Session::new(self.config)?;
        session.select_level(level)?;
        let scoreboard = session.scoreboard();
        players.insert(
            player.clone(),
            PlayerSlot {
                token: 0,
                pending: false,
                session,
            },
        );
        debug!(player = %player, level = %level, "created session");
        Ok(scoreboard)
    }

    /// Starts a new game, discarding any previous one for the player.
    ///
    /// Without an explicit level the previously selected one is reused.
    ///
    /// # Errors
    ///
    /// Returns `GameError::LevelRequired` when a level is required but unknown,
    /// `GameError::Supply` when no pool could be produced, and
    /// `GameError::Superseded` when a newer start for the same player won.
    pub async fn start_game(
        &self,
        player: PlayerId,
        level: Option<LanguageLevel>,
    ) -> Result<GameStart, GameError> {
        let (token, level) = {
            let mut players = self.lock()?;
            let previous = players.get(&player).and_then(|slot| slot.session.level());
            let level = match level.or(previous) {
                Some(level) => level,
                None if self.config.require_level => return Err(GameError::LevelRequired),
                None => LanguageLevel::default(),
            };
            let mut session = Session::new(self.config)?;
            session.select_level(level)?;
            let token = self.next_token.fetch_add(1, Ordering::Relaxed);
            players.insert(
                player.clone(),
                PlayerSlot {
                    token,
                    pending: true,
                    session,
                },
            );
            (token, level)
        };

        let minimum = self.config.total_rounds as usize;
        let pool = self.supply.request_pool(minimum, level).await;

        let mut players = self.lock()?;
        let slot = match players.get_mut(&player) {
            Some(slot) if slot.token == token => slot,
            _ => {
                info!(player = %player, token, "discarding superseded start-game result");
                return Err(GameError::Superseded);
            }
        };
        slot.pending = false;
        slot.session.attach_pool(pool?)?;
        let round = slot.session.start(self.clock.now())?.clone();
        info!(player = %player, level = %level, "game started");
        Ok(GameStart {
            player_id: player,
            round,
            scoreboard: slot.session.scoreboard(),
        })
    }

    /// Scores an answer, then tries to replace the explanation with a richer one.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Engine` wrapping `EngineError::StaleAnswer` when the
    /// answer does not match the active round; no counter changes in that case.
    pub async fn submit_answer(
        &self,
        player: &PlayerId,
        answer: Answer,
    ) -> Result<Feedback, GameError> {
        let (mut feedback, item) = {
            let mut players = self.lock()?;
            let slot = players
                .get_mut(player)
                .ok_or_else(|| GameError::UnknownPlayer(player.clone()))?;
            let item = slot.session.current_round().map(|round| round.item().clone());
            let feedback = slot.session.submit(answer).inspect_err(|e| {
                debug!(player = %player, round = %answer.round_id, error = %e, "answer refused");
            })?;
            (feedback, item)
        };

        if let (Some(explainer), Some(item)) = (&self.explainer, item) {
            match explainer.explain(&item, feedback.is_correct).await {
                Ok(text) => feedback.explanation = text,
                Err(e) => debug!(error = %e, "keeping built-in explanation"),
            }
        }
        Ok(feedback)
    }

    /// Moves past the feedback screen.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Engine` unless feedback is showing.
    pub fn continue_game(&self, player: &PlayerId) -> Result<Advance, GameError> {
        let now = self.clock.now();
        self.with_session(player, |session| {
            let advance = session.advance(now)?;
            if let Advance::Complete(board) = &advance {
                info!(
                    player = %player,
                    score = board.score,
                    accuracy = board.accuracy,
                    "game complete"
                );
            }
            Ok(advance)
        })
    }

    /// Starts a new game after a finished one, at the same level.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Engine` unless the game is complete, plus every
    /// error of [`GameService::start_game`].
    pub async fn restart(&self, player: &PlayerId) -> Result<GameStart, GameError> {
        let level = self.with_session(player, |session| {
            session.restart()?;
            Ok(session.level())
        })?;
        self.start_game(player.clone(), level).await
    }

    /// # Errors
    ///
    /// Returns `GameError::UnknownPlayer` if the player has no session.
    pub fn scoreboard(&self, player: &PlayerId) -> Result<Scoreboard, GameError> {
        self.with_session(player, |session| Ok(session.scoreboard()))
    }

    /// # Errors
    ///
    /// Returns `GameError::UnknownPlayer` if the player has no session.
    pub fn state(&self, player: &PlayerId) -> Result<GameState, GameError> {
        self.with_session(player, |session| Ok(session.state()))
    }

    /// # Errors
    ///
    /// Returns `GameError::UnknownPlayer` if the player has no session.
    pub fn current_round(&self, player: &PlayerId) -> Result<Option<Round>, GameError> {
        self.with_session(player, |session| Ok(session.current_round().cloned()))
    }

    /// Drops the player's session. Returns whether one existed.
    ///
    /// # Errors
    ///
    /// Returns `GameError::StatePoisoned` if the session map is unusable.
    pub fn end_session(&self, player: &PlayerId) -> Result<bool, GameError> {
        let removed = self.lock()?.remove(player).is_some();
        if removed {
            debug!(player = %player, "session ended");
        }
        Ok(removed)
    }

    fn with_session<T>(
        &self,
        player: &PlayerId,
        f: impl FnOnce(&mut Session) -> Result<T, GameError>,
    ) -> Result<T, GameError> {
        let mut players = self.lock()?;
        let slot = players
            .get_mut(player)
            .ok_or_else(|| GameError::UnknownPlayer(player.clone()))?;
        f(&mut slot.session)
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<PlayerId, PlayerSlot>>, GameError> {
        self.players
            .lock()
            .map_err(|e| GameError::StatePoisoned(e.to_string()))
    }
}
