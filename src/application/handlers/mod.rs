//! Application handlers.
//!
//! Command handlers that orchestrate domain operations over the ports.

pub mod process_turn;
pub mod reload_catalog;

pub use process_turn::{
    ApiCallRecord, ProcessTurnCommand, ProcessTurnHandler, TurnMetadata, TurnRejection, TurnResult,
};
pub use reload_catalog::{ReloadCatalogHandler, ReloadCatalogResult};
