//! HTTP handlers for the turn endpoints.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;

use crate::application::handlers::{ProcessTurnHandler, ReloadCatalogHandler, TurnRejection};

use super::dto::{
    ErrorResponse, HealthResponse, ProcessTurnRequest, ProcessTurnResponse, ReloadResponse,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct TurnHandlers {
    process_handler: Arc<ProcessTurnHandler>,
    reload_handler: Arc<ReloadCatalogHandler>,
}

impl TurnHandlers {
    pub fn new(
        process_handler: Arc<ProcessTurnHandler>,
        reload_handler: Arc<ReloadCatalogHandler>,
    ) -> Self {
        Self {
            process_handler,
            reload_handler,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /process - Process one conversation turn
pub async fn process_turn(
    State(handlers): State<TurnHandlers>,
    Json(req): Json<ProcessTurnRequest>,
) -> Response {
    let cmd = match req.into_command() {
        Ok(cmd) => cmd,
        Err(message) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorResponse::unprocessable(message)),
            )
                .into_response()
        }
    };

    match handlers.process_handler.handle(cmd).await {
        Ok(result) => {
            let response: ProcessTurnResponse = result.into();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_turn_rejection(e),
    }
}

/// POST /reload_config - Reload the workflow catalog
pub async fn reload_config(State(handlers): State<TurnHandlers>) -> Response {
    match handlers.reload_handler.handle() {
        Ok(result) => {
            let response = ReloadResponse {
                status: "success",
                message: "Workflow catalog reloaded".to_string(),
                business_types_count: result.business_types_count,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::internal(format!("Catalog reload failed: {}", e))),
        )
            .into_response(),
    }
}

/// GET /health - Liveness check
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        timestamp: Utc::now().timestamp(),
    })
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn handle_turn_rejection(rejection: TurnRejection) -> Response {
    match rejection {
        TurnRejection::Unauthorized(e) => (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::unauthorized(e.reason())),
        )
            .into_response(),
        TurnRejection::InvalidRequest(message) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse::unprocessable(message)),
        )
            .into_response(),
    }
}
