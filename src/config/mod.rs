//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `SUPPORT_FLOW` prefix and nested values use double underscores as separators.
//!
//! Business configuration (keywords, templates, routes) is not here; it lives in
//! the YAML workflow catalog named by `workflow.catalog_path`.
//!
//! # Example
//!
//! ```no_run
//! use support_flow::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod auth;
mod backend;
mod classifier;
mod error;
mod notifier;
mod server;
mod workflow;

pub use auth::{AnonymousPolicy, AuthConfig};
pub use backend::BackendConfig;
pub use classifier::ClassifierConfig;
pub use error::{ConfigError, ValidationError};
pub use notifier::NotifierConfig;
pub use server::{Environment, ServerConfig};
pub use workflow::WorkflowConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Credential token settings
    pub auth: AuthConfig,

    /// Order/activity query backend
    pub backend: BackendConfig,

    /// Semantic classification service
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Image notification channel
    #[serde(default)]
    pub notifier: NotifierConfig,

    /// Workflow catalog location
    #[serde(default)]
    pub workflow: WorkflowConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `SUPPORT_FLOW` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `SUPPORT_FLOW__SERVER__PORT=8000` -> `server.port = 8000`
    /// - `SUPPORT_FLOW__AUTH__SECRET_KEY=...` -> `auth.secret_key = ...`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SUPPORT_FLOW")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.auth.validate(&self.server.environment)?;
        self.backend.validate()?;
        self.classifier.validate(self.is_production())?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global; serialize the tests that touch them.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn set_minimal_env() {
        env::set_var("SUPPORT_FLOW__AUTH__SECRET_KEY", "dev-secret");
        env::set_var("SUPPORT_FLOW__BACKEND__BASE_URL", "http://backend.local");
    }

    fn clear_env() {
        for key in [
            "SUPPORT_FLOW__AUTH__SECRET_KEY",
            "SUPPORT_FLOW__BACKEND__BASE_URL",
            "SUPPORT_FLOW__SERVER__PORT",
            "SUPPORT_FLOW__SERVER__ENVIRONMENT",
            "SUPPORT_FLOW__AUTH__ANONYMOUS_POLICY",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.expect("config should load");
        assert_eq!(config.auth.secret_key, "dev-secret");
        assert_eq!(config.backend.base_url, "http://backend.local");
        assert_eq!(config.backend.site, 1);
        assert_eq!(config.server.port, 8000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_anonymous_policy_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("SUPPORT_FLOW__AUTH__ANONYMOUS_POLICY", "proceed");
        let result = AppConfig::load();
        clear_env();

        assert_eq!(result.unwrap().auth.anonymous_policy, AnonymousPolicy::Proceed);
    }

    #[test]
    fn test_production_requires_classifier_key() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("SUPPORT_FLOW__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_backend_fails_to_load() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("SUPPORT_FLOW__AUTH__SECRET_KEY", "dev-secret");
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_err());
    }
}
