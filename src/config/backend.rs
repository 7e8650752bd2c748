//! Order/activity query backend configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Base URL the `/query/...` paths are appended to
    pub base_url: String,

    /// Site number for queries whose turn names no site
    #[serde(default = "default_site")]
    pub site: i64,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ValidationError::InvalidUrl("backend"));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

fn default_site() -> i64 {
    1
}

fn default_timeout() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_http_url() {
        let config = BackendConfig {
            base_url: "backend.local".to_string(),
            site: 1,
            timeout_secs: 10,
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidUrl("backend")));
    }
}
