//! Workflow catalog error types.

use thiserror::Error;

/// Errors that occur loading or validating a workflow catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid catalog: {0}")]
    Invalid(String),

    #[error("Catalog has no source file to reload from")]
    NoSource,
}

impl CatalogError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        CatalogError::Invalid(reason.into())
    }
}
