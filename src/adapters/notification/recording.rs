//! In-process notifiers: one that records for tests, one that only logs.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::ports::{ImageNotification, ImageNotifier, NotifyError};

/// Records every notification; optionally fails each dispatch.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<ImageNotification>>>,
    failure: Option<NotifyError>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every dispatch is recorded, then fails with `error`.
    pub fn failing(error: NotifyError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<ImageNotification> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ImageNotification>> {
        self.sent.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ImageNotifier for RecordingNotifier {
    async fn dispatch(&self, notification: ImageNotification) -> Result<(), NotifyError> {
        self.lock().push(notification);
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

/// Used when no notification channel is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotifier;

#[async_trait]
impl ImageNotifier for LoggingNotifier {
    async fn dispatch(&self, notification: ImageNotification) -> Result<(), NotifyError> {
        tracing::warn!(
            count = notification.images.len(),
            user_id = %notification.user_id,
            session_id = %notification.session_id,
            "No notification channel configured; images not forwarded"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{SessionId, UserId};

    fn notification() -> ImageNotification {
        ImageNotification {
            images: vec!["a".into(), "b".into()],
            user_id: UserId::new("u").unwrap(),
            session_id: SessionId::new("s").unwrap(),
        }
    }

    #[tokio::test]
    async fn failing_notifier_still_records() {
        let notifier = RecordingNotifier::failing(NotifyError::Unavailable("down".into()));
        assert!(notifier.dispatch(notification()).await.is_err());
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn logging_notifier_accepts_everything() {
        assert!(LoggingNotifier.dispatch(notification()).await.is_ok());
    }
}
