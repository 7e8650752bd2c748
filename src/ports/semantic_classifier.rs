//! Semantic Classifier Port - model-based text classification.
//!
//! Used as the fallback when keyword matching cannot decide a turn's business
//! type, and to match a user's message against a listed set of activity names.
//! The classifier is always constrained to a closed label set; a label outside
//! that set is treated as `none`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::HistoryEntry;

/// Label the classifier returns when nothing in the allowed set fits.
pub const NONE_LABEL: &str = "none";

/// Port for the external semantic classification service.
#[async_trait]
pub trait SemanticClassifier: Send + Sync {
    /// Classify `request.message` into one of `request.allowed_labels`.
    async fn classify(&self, request: SemanticRequest) -> Result<SemanticLabel, ClassifierError>;
}

/// Classification request.
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticRequest {
    pub message: String,
    pub history: Vec<HistoryEntry>,
    /// Closed label set; always includes [`NONE_LABEL`].
    pub allowed_labels: Vec<String>,
}

impl SemanticRequest {
    pub fn new(message: impl Into<String>, labels: impl IntoIterator<Item = String>) -> Self {
        let mut allowed_labels: Vec<String> = labels.into_iter().collect();
        if !allowed_labels.iter().any(|l| l == NONE_LABEL) {
            allowed_labels.push(NONE_LABEL.to_string());
        }
        Self {
            message: message.into(),
            history: Vec::new(),
            allowed_labels,
        }
    }

    pub fn with_history(mut self, history: Vec<HistoryEntry>) -> Self {
        self.history = history;
        self
    }

    pub fn allows(&self, label: &str) -> bool {
        self.allowed_labels.iter().any(|l| l == label)
    }
}

/// Classification result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticLabel {
    pub label: String,
    pub confidence: f64,
}

impl SemanticLabel {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }

    pub fn none() -> Self {
        Self::new(NONE_LABEL, 0.0)
    }

    pub fn is_none(&self) -> bool {
        self.label == NONE_LABEL
    }
}

/// Errors from the semantic classification service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifierError {
    #[error("classifier unavailable: {0}")]
    Unavailable(String),

    #[error("classifier timed out")]
    Timeout,

    #[error("classifier returned an unparseable reply: {0}")]
    InvalidResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_always_allows_none() {
        let request = SemanticRequest::new("hi", vec!["deposit".to_string()]);
        assert!(request.allows("deposit"));
        assert!(request.allows(NONE_LABEL));
        assert!(!request.allows("withdrawal"));
    }

    #[test]
    fn none_label_is_recognized() {
        assert!(SemanticLabel::none().is_none());
        assert!(!SemanticLabel::new("deposit", 0.9).is_none());
    }
}
