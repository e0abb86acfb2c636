use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use services::{GameError, SupplyError};
use swipe_core::EngineError;
use swipe_core::model::ParseIdError;

/// Failure of one API call, rendered as `{"error": ...}`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error(transparent)]
    InvalidId(#[from] ParseIdError),
    #[error(transparent)]
    Game(#[from] GameError),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidId(_) => StatusCode::BAD_REQUEST,
            ApiError::Game(err) => game_status(err),
        }
    }
}

fn game_status(err: &GameError) -> StatusCode {
    match err {
        GameError::UnknownPlayer(_) => StatusCode::NOT_FOUND,
        GameError::LevelRequired => StatusCode::UNPROCESSABLE_ENTITY,
        GameError::Superseded | GameError::StartPending => StatusCode::CONFLICT,
        GameError::Engine(EngineError::StaleAnswer { .. })
        | GameError::Engine(EngineError::InvalidTransition { .. }) => StatusCode::CONFLICT,
        GameError::Supply(supply)
            if supply.is_unreachable() || matches!(supply, SupplyError::Exhausted { .. }) =>
        {
            StatusCode::SERVICE_UNAVAILABLE
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn is_supply_failure(err: &GameError) -> bool {
    matches!(
        err,
        GameError::Supply(_) | GameError::Engine(EngineError::EmptyPool)
    )
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Game(err) if is_supply_failure(err) => {
                if let GameError::Supply(SupplyError::Exhausted { produced, required }) = err {
                    warn!(produced, required, "supply exhausted");
                } else {
                    warn!(error = %err, "pool request failed");
                }
                "generation failed".to_string()
            }
            ApiError::Game(err) if status.is_server_error() => {
                error!(error = %err, "request failed");
                "internal error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swipe_core::model::{PlayerId, RoundId};

    #[test]
    fn statuses_follow_the_error_kind() {
        let stale = ApiError::from(GameError::from(EngineError::StaleAnswer {
            expected: None,
            received: RoundId::generate(),
        }));
        assert_eq!(stale.status(), StatusCode::CONFLICT);

        let pending = ApiError::from(GameError::StartPending);
        assert_eq!(pending.status(), StatusCode::CONFLICT);

        let unknown = ApiError::from(GameError::UnknownPlayer(PlayerId::generate()));
        assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

        let timeout = ApiError::from(GameError::from(SupplyError::Timeout));
        assert_eq!(timeout.status(), StatusCode::SERVICE_UNAVAILABLE);

        let exhausted = ApiError::from(GameError::from(SupplyError::Exhausted {
            produced: 18,
            required: 20,
        }));
        assert_eq!(exhausted.status(), StatusCode::SERVICE_UNAVAILABLE);

        let unreadable = ApiError::from(GameError::from(SupplyError::from(
            storage::StorageError::NotFound("words.json".into()),
        )));
        assert_eq!(unreadable.status(), StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(
            ApiError::from("not-a-uuid".parse::<RoundId>().unwrap_err()).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
