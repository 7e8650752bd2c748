//! Intent strategy contract and the values that flow through the chain.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::catalog::WorkflowCatalog;
use crate::domain::foundation::{BusinessType, HistoryEntry, Language};
use crate::ports::ClassifierError;

/// Caller-supplied `{mainCategory: subCategory}` hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryHint {
    pub main: String,
    pub sub: Option<String>,
}

impl CategoryHint {
    pub fn new(main: impl Into<String>, sub: Option<String>) -> Self {
        Self {
            main: main.into(),
            sub,
        }
    }
}

/// Everything a strategy may look at.
#[derive(Debug, Clone, Copy)]
pub struct IntentInput<'a> {
    pub message: &'a str,
    pub history: &'a [HistoryEntry],
    pub language: Language,
    pub category: Option<&'a CategoryHint>,
    /// Business type already carried by the conversation, or `Unset`.
    pub assigned: BusinessType,
    /// Explicit request to drop the assigned business type.
    pub reset: bool,
}

/// Which strategy produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    Assigned,
    CategoryHint,
    Keyword,
    Semantic,
    /// No strategy was confident; conservative handoff.
    Default,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum IntentDecision {
    Business {
        business_type: BusinessType,
        source: DecisionSource,
    },
    /// Answer immediately without entering a workflow.
    DirectAnswer { name: String, answer: String },
}

impl IntentDecision {
    pub fn business(business_type: BusinessType, source: DecisionSource) -> Self {
        IntentDecision::Business {
            business_type,
            source,
        }
    }

    /// The conservative fallback when classification is ambiguous.
    pub fn ambiguous() -> Self {
        Self::business(BusinessType::HumanService, DecisionSource::Default)
    }
}

/// A strategy either decides or defers to the next one.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Decided(IntentDecision),
    Defer,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentError {
    #[error("semantic classification failed: {0}")]
    Semantic(#[from] ClassifierError),
}

/// One link of the intent classification chain.
#[async_trait]
pub trait ClassifierStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn resolve(
        &self,
        input: &IntentInput<'_>,
        catalog: &WorkflowCatalog,
    ) -> Result<Resolution, IntentError>;
}
