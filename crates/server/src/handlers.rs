use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::{Value, json};

use swipe_core::Advance;
use swipe_core::model::{Answer, PlayerId, RoundId};

use crate::dto::{
    ContinueView, FeedbackView, GameView, LevelView, PlayerRequest, SelectLevelRequest,
    StartGameRequest, StatsView, SubmitAnswerRequest,
};
use crate::error::ApiError;
use crate::state::AppState;

type Shared = State<Arc<AppState>>;

fn parse_player(raw: &str) -> Result<PlayerId, ApiError> {
    Ok(raw.parse()?)
}

/// Uses the client's id when given, otherwise mints one.
fn player_or_new(raw: Option<String>) -> Result<PlayerId, ApiError> {
    raw.map_or_else(|| Ok(PlayerId::generate()), |raw| parse_player(&raw))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

pub async fn select_level(
    State(state): Shared,
    Json(req): Json<SelectLevelRequest>,
) -> Result<Json<LevelView>, ApiError> {
    let player = player_or_new(req.player_id)?;
    let board = state.games.select_level(&player, req.language_level)?;
    Ok(Json(LevelView {
        player_id: player.to_string(),
        stats: board.into(),
    }))
}

pub async fn start_game(
    State(state): Shared,
    Json(req): Json<StartGameRequest>,
) -> Result<Json<GameView>, ApiError> {
    let player = player_or_new(req.player_id)?;
    let start = state.games.start_game(player, req.language_level).await?;
    Ok(Json(start.into()))
}

pub async fn submit_answer(
    State(state): Shared,
    Json(req): Json<SubmitAnswerRequest>,
) -> Result<Json<FeedbackView>, ApiError> {
    let player = parse_player(&req.player_id)?;
    let round_id: RoundId = req.round_id.parse()?;
    let feedback = state
        .games
        .submit_answer(&player, Answer::new(round_id, req.choice))
        .await?;
    Ok(Json(feedback.into()))
}

pub async fn continue_game(
    State(state): Shared,
    Json(req): Json<PlayerRequest>,
) -> Result<Json<ContinueView>, ApiError> {
    let player = parse_player(&req.player_id)?;
    let view = match state.games.continue_game(&player)? {
        Advance::Next(round) => ContinueView {
            round: Some((&round).into()),
            game_complete: false,
            stats: state.games.scoreboard(&player)?.into(),
        },
        Advance::Complete(board) => ContinueView {
            round: None,
            game_complete: true,
            stats: board.into(),
        },
    };
    Ok(Json(view))
}

pub async fn restart(
    State(state): Shared,
    Json(req): Json<PlayerRequest>,
) -> Result<Json<GameView>, ApiError> {
    let player = parse_player(&req.player_id)?;
    let start = state.games.restart(&player).await?;
    Ok(Json(start.into()))
}

pub async fn stats(
    State(state): Shared,
    Path(player_id): Path<String>,
) -> Result<Json<StatsView>, ApiError> {
    let player = parse_player(&player_id)?;
    Ok(Json(state.games.scoreboard(&player)?.into()))
}

pub async fn end_session(
    State(state): Shared,
    Path(player_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let player = parse_player(&player_id)?;
    state.games.end_session(&player)?;
    Ok(StatusCode::NO_CONTENT)
}
