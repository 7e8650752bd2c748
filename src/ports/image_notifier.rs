//! Image Notifier Port - forwards user-attached images to human agents.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{SessionId, UserId};

#[async_trait]
pub trait ImageNotifier: Send + Sync {
    /// Deliver the images with user and session identity.
    async fn dispatch(&self, notification: ImageNotification) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageNotification {
    pub images: Vec<String>,
    pub user_id: UserId,
    pub session_id: SessionId,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifyError {
    #[error("notification channel unavailable: {0}")]
    Unavailable(String),

    #[error("notification rejected: {0}")]
    Rejected(String),
}
