//! Scripted query backend for tests and local runs.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::outcome::{QueryEnvelope, QueryError};
use crate::ports::{OrderQueryService, QueryRequest};

/// Returns queued responses in order and records every request.
///
/// An empty queue answers with a transport error, so a test that forgets to
/// script a call sees a system failure rather than a silent success.
#[derive(Debug, Clone, Default)]
pub struct MockOrderQueryService {
    responses: Arc<Mutex<VecDeque<Result<QueryEnvelope, QueryError>>>>,
    requests: Arc<Mutex<Vec<QueryRequest>>>,
}

impl MockOrderQueryService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue(&self, response: Result<QueryEnvelope, QueryError>) {
        self.lock_responses().push_back(response);
    }

    pub fn queue_envelope(&self, envelope: QueryEnvelope) {
        self.queue(Ok(envelope));
    }

    /// Builder form queueing a successful status reply.
    pub fn with_status(self, status: &str) -> Self {
        self.queue_envelope(QueryEnvelope::with_status(status));
        self
    }

    pub fn requests(&self) -> Vec<QueryRequest> {
        self.lock_requests().clone()
    }

    pub fn request_count(&self) -> usize {
        self.lock_requests().len()
    }

    fn lock_responses(&self) -> MutexGuard<'_, VecDeque<Result<QueryEnvelope, QueryError>>> {
        self.responses.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_requests(&self) -> MutexGuard<'_, Vec<QueryRequest>> {
        self.requests.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl OrderQueryService for MockOrderQueryService {
    async fn query(&self, request: QueryRequest) -> Result<QueryEnvelope, QueryError> {
        self.lock_requests().push(request);
        self.lock_responses()
            .pop_front()
            .unwrap_or_else(|| Err(QueryError::Transport("no scripted response".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SessionId;
    use crate::ports::QueryKind;

    #[tokio::test]
    async fn records_requests_and_drains_queue() {
        let mock = MockOrderQueryService::new().with_status("success");
        let request = QueryRequest::new(SessionId::new("s").unwrap(), QueryKind::ActivityList);

        let first = mock.query(request.clone()).await.unwrap();
        assert_eq!(first.status(), Some("success"));
        assert!(matches!(
            mock.query(request).await,
            Err(QueryError::Transport(_))
        ));
        assert_eq!(mock.request_count(), 2);
        assert_eq!(mock.requests()[0].kind, QueryKind::ActivityList);
    }
}
