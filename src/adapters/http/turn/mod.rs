//! HTTP adapter for the conversation turn endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    ErrorResponse, HealthResponse, ProcessTurnRequest, ProcessTurnResponse, ReloadResponse,
};
pub use handlers::TurnHandlers;
pub use routes::turn_routes;
