//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the support workflow domain.

mod business_type;
mod errors;
mod history;
mod ids;
mod language;
mod state_machine;

pub use business_type::BusinessType;
pub use errors::ValidationError;
pub use history::{HistoryEntry, HistoryRole};
pub use ids::{SessionId, UserId};
pub use language::Language;
pub use state_machine::StateMachine;
