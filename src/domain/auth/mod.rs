//! Authentication of logged-in turns.

mod token;

pub use token::{TokenError, TokenVerifier, DEFAULT_CLOCK_SKEW_SECS, DEFAULT_MAX_AGE_SECS};
