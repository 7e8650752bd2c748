//! Mock semantic classifier for testing.
//!
//! Returns queued results in order and records every request. With an empty
//! queue it answers `none`, which makes the intent chain fall back to a human.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::ports::{ClassifierError, SemanticClassifier, SemanticLabel, SemanticRequest};

#[derive(Debug, Clone, Default)]
pub struct MockSemanticClassifier {
    responses: Arc<Mutex<VecDeque<Result<SemanticLabel, ClassifierError>>>>,
    calls: Arc<Mutex<Vec<SemanticRequest>>>,
}

impl MockSemanticClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful classification.
    pub fn queue_label(&self, label: SemanticLabel) {
        self.lock_responses().push_back(Ok(label));
    }

    /// Queues a failure.
    pub fn queue_error(&self, error: ClassifierError) {
        self.lock_responses().push_back(Err(error));
    }

    /// Builder form of [`queue_label`](Self::queue_label).
    pub fn with_label(self, label: impl Into<String>, confidence: f64) -> Self {
        self.queue_label(SemanticLabel::new(label, confidence));
        self
    }

    pub fn call_count(&self) -> usize {
        self.lock_calls().len()
    }

    pub fn last_request(&self) -> Option<SemanticRequest> {
        self.lock_calls().last().cloned()
    }

    fn lock_responses(
        &self,
    ) -> std::sync::MutexGuard<'_, VecDeque<Result<SemanticLabel, ClassifierError>>> {
        self.responses.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<SemanticRequest>> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl SemanticClassifier for MockSemanticClassifier {
    async fn classify(&self, request: SemanticRequest) -> Result<SemanticLabel, ClassifierError> {
        self.lock_calls().push(request);
        self.lock_responses()
            .pop_front()
            .unwrap_or_else(|| Ok(SemanticLabel::none()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_queued_results_then_none() {
        let mock = MockSemanticClassifier::new().with_label("deposit", 0.9);
        mock.queue_error(ClassifierError::Timeout);

        let request = SemanticRequest::new("x", Vec::new());
        assert_eq!(
            mock.classify(request.clone()).await,
            Ok(SemanticLabel::new("deposit", 0.9))
        );
        assert_eq!(mock.classify(request.clone()).await, Err(ClassifierError::Timeout));
        assert!(mock.classify(request).await.unwrap().is_none());
        assert_eq!(mock.call_count(), 3);
    }
}
