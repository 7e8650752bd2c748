//! The standard intent strategies, in chain order.

use async_trait::async_trait;
use std::sync::Arc;

use super::strategy::{
    ClassifierStrategy, DecisionSource, IntentDecision, IntentError, IntentInput, Resolution,
};
use crate::domain::catalog::{RouteTarget, WorkflowCatalog};
use crate::domain::foundation::BusinessType;
use crate::ports::{SemanticClassifier, SemanticRequest};

/// Keeps the conversation's business type unless the turn asks for a reset.
pub struct AssignedTypeStrategy;

#[async_trait]
impl ClassifierStrategy for AssignedTypeStrategy {
    fn name(&self) -> &'static str {
        "assigned_type"
    }

    async fn resolve(
        &self,
        input: &IntentInput<'_>,
        _catalog: &WorkflowCatalog,
    ) -> Result<Resolution, IntentError> {
        if input.assigned.is_set() && !input.reset {
            return Ok(Resolution::Decided(IntentDecision::business(
                input.assigned,
                DecisionSource::Assigned,
            )));
        }
        Ok(Resolution::Defer)
    }
}

/// Follows the caller's category hint through the configured routes.
pub struct CategoryHintStrategy;

#[async_trait]
impl ClassifierStrategy for CategoryHintStrategy {
    fn name(&self) -> &'static str {
        "category_hint"
    }

    async fn resolve(
        &self,
        input: &IntentInput<'_>,
        catalog: &WorkflowCatalog,
    ) -> Result<Resolution, IntentError> {
        let Some(hint) = input.category else {
            return Ok(Resolution::Defer);
        };

        let resolution = match catalog.route(&hint.main, hint.sub.as_deref()) {
            Some(RouteTarget::BusinessType(business_type)) => Resolution::Decided(
                IntentDecision::business(*business_type, DecisionSource::CategoryHint),
            ),
            Some(RouteTarget::DirectAnswer(name)) => {
                match catalog.direct_answer(name, input.language) {
                    Some(answer) => Resolution::Decided(IntentDecision::DirectAnswer {
                        name: name.clone(),
                        answer,
                    }),
                    None => Resolution::Defer,
                }
            }
            None => Resolution::Defer,
        };
        Ok(resolution)
    }
}

/// Per-language keyword tables; first business type in declaration order wins.
pub struct KeywordStrategy;

#[async_trait]
impl ClassifierStrategy for KeywordStrategy {
    fn name(&self) -> &'static str {
        "keyword"
    }

    async fn resolve(
        &self,
        input: &IntentInput<'_>,
        catalog: &WorkflowCatalog,
    ) -> Result<Resolution, IntentError> {
        Ok(catalog
            .keyword_match(input.message, input.language)
            .map(|bt| Resolution::Decided(IntentDecision::business(bt, DecisionSource::Keyword)))
            .unwrap_or(Resolution::Defer))
    }
}

/// Model-based fallback constrained to the configured business types.
///
/// `none`, an unknown label, or a confidence below the catalog threshold
/// defers; the chain then hands off to a human.
pub struct SemanticStrategy {
    classifier: Arc<dyn SemanticClassifier>,
}

impl SemanticStrategy {
    pub fn new(classifier: Arc<dyn SemanticClassifier>) -> Self {
        Self { classifier }
    }
}

#[async_trait]
impl ClassifierStrategy for SemanticStrategy {
    fn name(&self) -> &'static str {
        "semantic"
    }

    async fn resolve(
        &self,
        input: &IntentInput<'_>,
        catalog: &WorkflowCatalog,
    ) -> Result<Resolution, IntentError> {
        let mut labels: Vec<String> = catalog
            .business_types
            .iter()
            .map(|p| p.business_type.semantic_label().to_string())
            .collect();
        let human = BusinessType::HumanService.semantic_label().to_string();
        if !labels.contains(&human) {
            labels.push(human);
        }

        let request =
            SemanticRequest::new(input.message, labels).with_history(input.history.to_vec());
        let result = self.classifier.classify(request.clone()).await?;

        if !request.allows(&result.label) {
            tracing::warn!(label = %result.label, "Semantic classifier returned a label outside the allowed set");
            return Ok(Resolution::Defer);
        }
        if result.is_none() || result.confidence < catalog.classification.min_confidence {
            return Ok(Resolution::Defer);
        }

        Ok(BusinessType::from_semantic_label(&result.label)
            .map(|bt| Resolution::Decided(IntentDecision::business(bt, DecisionSource::Semantic)))
            .unwrap_or(Resolution::Defer))
    }
}
