//! Semantic classifier adapters.
//!
//! - `OpenAiSemanticClassifier` - OpenAI-compatible chat completions
//! - `MockSemanticClassifier` - queued responses for tests and local runs

mod mock_classifier;
mod openai_classifier;

pub use mock_classifier::MockSemanticClassifier;
pub use openai_classifier::{OpenAiClassifierConfig, OpenAiSemanticClassifier};
