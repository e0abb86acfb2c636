//! HTTP boundary for the swipe-card drill.

#![forbid(unsafe_code)]

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use config::{ArgsError, ServerConfig, SupplyMode};
pub use error::ApiError;
pub use state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/select-level", post(handlers::select_level))
        .route("/api/start-game", post(handlers::start_game))
        .route("/api/submit-answer", post(handlers::submit_answer))
        .route("/api/continue", post(handlers::continue_game))
        .route("/api/restart", post(handlers::restart))
        .route("/api/stats/:player_id", get(handlers::stats))
        .route("/api/session/:player_id", delete(handlers::end_session))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Binds `addr` and serves until the listener fails.
///
/// # Errors
///
/// Returns the I/O error from binding or accepting connections.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, create_router(state)).await
}
