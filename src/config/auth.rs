//! Credential token configuration

use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;
use crate::domain::auth::{DEFAULT_CLOCK_SKEW_SECS, DEFAULT_MAX_AGE_SECS};

/// Minimum token secret length accepted in production.
const MIN_PRODUCTION_SECRET_LEN: usize = 16;

/// Token authentication configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret shared with the platform that issues tokens
    pub secret_key: String,

    /// Maximum token age in seconds
    #[serde(default = "default_max_age")]
    pub max_age_secs: i64,

    /// Tolerance for tokens stamped in the future, in seconds
    #[serde(default = "default_clock_skew")]
    pub clock_skew_secs: i64,

    /// What to do with turns from users who are not logged in
    #[serde(default)]
    pub anonymous_policy: AnonymousPolicy,
}

/// Handling of anonymous turns.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnonymousPolicy {
    /// Reply with the localized "please log in" prompt.
    #[default]
    PromptLogin,
    /// Run the workflow without authentication.
    Proceed,
}

impl AuthConfig {
    /// Validate auth configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.secret_key.trim().is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__SECRET_KEY"));
        }
        if *environment == Environment::Production
            && self.secret_key.len() < MIN_PRODUCTION_SECRET_LEN
        {
            return Err(ValidationError::WeakSecret);
        }
        if self.max_age_secs <= 0 {
            return Err(ValidationError::InvalidTokenAge);
        }
        if self.clock_skew_secs < 0 {
            return Err(ValidationError::InvalidClockSkew);
        }
        Ok(())
    }
}

fn default_max_age() -> i64 {
    DEFAULT_MAX_AGE_SECS
}

fn default_clock_skew() -> i64 {
    DEFAULT_CLOCK_SKEW_SECS
}
