//! Application layer - Commands and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! It owns no state between turns; the conversation state travels with the
//! caller.

pub mod handlers;

pub use handlers::{
    ApiCallRecord, ProcessTurnCommand, ProcessTurnHandler, ReloadCatalogHandler,
    ReloadCatalogResult, TurnMetadata, TurnRejection, TurnResult,
};
