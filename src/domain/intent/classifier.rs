//! Intent classification chain.

use std::sync::Arc;

use super::strategies::{AssignedTypeStrategy, CategoryHintStrategy, KeywordStrategy, SemanticStrategy};
use super::strategy::{ClassifierStrategy, IntentDecision, IntentError, IntentInput, Resolution};
use crate::domain::catalog::WorkflowCatalog;
use crate::ports::SemanticClassifier;

/// Runs strategies in order until one decides.
///
/// The standard chain is assigned type, category hint, keyword, semantic. When
/// every strategy defers the result is the conservative human handoff; the
/// classifier never guesses.
pub struct IntentClassifier {
    strategies: Vec<Box<dyn ClassifierStrategy>>,
}

impl IntentClassifier {
    pub fn new(semantic: Arc<dyn SemanticClassifier>) -> Self {
        Self::with_strategies(vec![
            Box::new(AssignedTypeStrategy),
            Box::new(CategoryHintStrategy),
            Box::new(KeywordStrategy),
            Box::new(SemanticStrategy::new(semantic)),
        ])
    }

    pub fn with_strategies(strategies: Vec<Box<dyn ClassifierStrategy>>) -> Self {
        Self { strategies }
    }

    pub async fn classify(
        &self,
        input: &IntentInput<'_>,
        catalog: &WorkflowCatalog,
    ) -> Result<IntentDecision, IntentError> {
        for strategy in &self.strategies {
            if let Resolution::Decided(decision) = strategy.resolve(input, catalog).await? {
                tracing::debug!(strategy = strategy.name(), ?decision, "Intent decided");
                return Ok(decision);
            }
        }
        tracing::debug!("No intent strategy was confident, defaulting to human service");
        Ok(IntentDecision::ambiguous())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockSemanticClassifier;
    use crate::domain::foundation::{BusinessType, HistoryEntry, Language};
    use crate::domain::intent::{CategoryHint, DecisionSource};
    use crate::ports::{ClassifierError, SemanticLabel};

    const YAML: &str = r#"
default_language: en
classification:
  min_confidence: 0.7
business_types:
  - business_type: S001
    keywords:
      en: ["top up", "deposit"]
  - business_type: S002
    keywords:
      en: ["withdraw"]
  - business_type: S003
    keywords:
      en: ["bonus"]
  - business_type: human_service
    keywords:
      en: ["agent"]
common_templates:
  handoff:
    en: "Transferring you to an agent."
category_routes:
  - main: Withdrawal
    target: {business_type: S002}
  - main: Account
    sub: Register
    target: {direct_answer: register}
direct_answers:
  register:
    en: "Tap Sign Up on the home page."
"#;

    fn catalog() -> WorkflowCatalog {
        WorkflowCatalog::from_yaml_str(YAML).unwrap()
    }

    fn input<'a>(message: &'a str, history: &'a [HistoryEntry]) -> IntentInput<'a> {
        IntentInput {
            message,
            history,
            language: Language::En,
            category: None,
            assigned: BusinessType::Unset,
            reset: false,
        }
    }

    fn business(decision: IntentDecision) -> (BusinessType, DecisionSource) {
        match decision {
            IntentDecision::Business {
                business_type,
                source,
            } => (business_type, source),
            other => panic!("Expected business decision, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn assigned_type_is_kept_without_reset() {
        let mock = Arc::new(MockSemanticClassifier::new());
        let classifier = IntentClassifier::new(mock.clone());
        let mut turn = input("I want to withdraw", &[]);
        turn.assigned = BusinessType::Deposit;

        let decided = classifier.classify(&turn, &catalog()).await.unwrap();
        assert_eq!(business(decided), (BusinessType::Deposit, DecisionSource::Assigned));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn reset_reclassifies_assigned_type() {
        let classifier = IntentClassifier::new(Arc::new(MockSemanticClassifier::new()));
        let mut turn = input("I want to withdraw", &[]);
        turn.assigned = BusinessType::Deposit;
        turn.reset = true;

        let decided = classifier.classify(&turn, &catalog()).await.unwrap();
        assert_eq!(business(decided), (BusinessType::Withdrawal, DecisionSource::Keyword));
    }

    #[tokio::test]
    async fn category_hint_beats_keywords() {
        let classifier = IntentClassifier::new(Arc::new(MockSemanticClassifier::new()));
        let hint = CategoryHint::new("Withdrawal", Some("Late".into()));
        let mut turn = input("my deposit", &[]);
        turn.category = Some(&hint);

        let decided = classifier.classify(&turn, &catalog()).await.unwrap();
        assert_eq!(
            business(decided),
            (BusinessType::Withdrawal, DecisionSource::CategoryHint)
        );
    }

    #[tokio::test]
    async fn direct_answer_route_bypasses_workflows() {
        let classifier = IntentClassifier::new(Arc::new(MockSemanticClassifier::new()));
        let hint = CategoryHint::new("Account", Some("Register".into()));
        let mut turn = input("how do I register", &[]);
        turn.category = Some(&hint);

        let decided = classifier.classify(&turn, &catalog()).await.unwrap();
        assert_eq!(
            decided,
            IntentDecision::DirectAnswer {
                name: "register".into(),
                answer: "Tap Sign Up on the home page.".into()
            }
        );
    }

    #[tokio::test]
    async fn keyword_match_avoids_semantic_call() {
        let mock = Arc::new(MockSemanticClassifier::new());
        let classifier = IntentClassifier::new(mock.clone());

        let decided = classifier
            .classify(&input("I need to top up", &[]), &catalog())
            .await
            .unwrap();
        assert_eq!(business(decided), (BusinessType::Deposit, DecisionSource::Keyword));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn confident_semantic_label_is_adopted() {
        let mock = Arc::new(MockSemanticClassifier::new());
        mock.queue_label(SemanticLabel::new("activity", 0.92));
        let classifier = IntentClassifier::new(mock.clone());

        let decided = classifier
            .classify(&input("where is my reward", &[]), &catalog())
            .await
            .unwrap();
        assert_eq!(business(decided), (BusinessType::Activity, DecisionSource::Semantic));

        let request = mock.last_request().unwrap();
        assert!(request.allows("human_service"));
        assert!(request.allows("none"));
    }

    #[tokio::test]
    async fn low_confidence_or_none_defaults_to_human() {
        let mock = Arc::new(MockSemanticClassifier::new());
        mock.queue_label(SemanticLabel::new("deposit", 0.5));
        mock.queue_label(SemanticLabel::none());
        mock.queue_label(SemanticLabel::new("lottery", 0.99));
        let classifier = IntentClassifier::new(mock);

        for _ in 0..3 {
            let decided = classifier
                .classify(&input("hmm", &[]), &catalog())
                .await
                .unwrap();
            assert_eq!(decided, IntentDecision::ambiguous());
        }
    }

    #[tokio::test]
    async fn semantic_failure_is_an_error() {
        let mock = Arc::new(MockSemanticClassifier::new());
        mock.queue_error(ClassifierError::Timeout);
        let classifier = IntentClassifier::new(mock);

        let result = classifier.classify(&input("hmm", &[]), &catalog()).await;
        assert_eq!(result, Err(IntentError::Semantic(ClassifierError::Timeout)));
    }
}
