//! HTTP routes for the turn endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{health, process_turn, reload_config, TurnHandlers};

/// Creates the router for `/process`, `/reload_config` and `/health`.
pub fn turn_routes(handlers: TurnHandlers) -> Router {
    Router::new()
        .route("/process", post(process_turn))
        .route("/reload_config", post(reload_config))
        .route("/health", get(health))
        .with_state(handlers)
}
