//! Interpretation of backend query results.
//!
//! - `signal` - control signals and reply message keys
//! - `status` - per-business-type status tables and `interpret`
//! - `envelope` - the backend response envelope and its transport errors
//! - `error_classifier` - user-input vs system error classification

mod envelope;
mod error_classifier;
mod signal;
mod status;

pub use envelope::{ActivityRef, QueryEnvelope, QueryError, STATE_OK};
pub use error_classifier::{ErrorClass, ErrorClassifier, ExpectedPayload};
pub use signal::{ControlSignal, MessageKey};
pub use status::{interpret, ActivityStatus, DepositStatus, StatusOutcome, WithdrawalStatus};
