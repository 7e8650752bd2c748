//! Telegram image forwarding.
//!
//! Each image is sent as its own `sendPhoto` call to the support chat, with a
//! caption naming the user and session so an agent can pick up the thread.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use std::time::Duration;

use crate::ports::{ImageNotification, ImageNotifier, NotifyError};

const TELEGRAM_API: &str = "https://api.telegram.org";

pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    bot_token: Secret<String>,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| NotifyError::Unavailable(format!("HTTP client: {}", e)))?;
        Ok(Self {
            client,
            api_base: TELEGRAM_API.to_string(),
            bot_token: Secret::new(bot_token.into()),
            chat_id: chat_id.into(),
        })
    }

    /// Points the notifier at a different Bot API host.
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    fn send_photo_url(&self) -> String {
        format!("{}/bot{}/sendPhoto", self.api_base, self.bot_token.expose_secret())
    }

    fn caption(notification: &ImageNotification) -> String {
        format!(
            "User: {} (session {})",
            notification.user_id, notification.session_id
        )
    }
}

#[async_trait]
impl ImageNotifier for TelegramNotifier {
    async fn dispatch(&self, notification: ImageNotification) -> Result<(), NotifyError> {
        let caption = Self::caption(&notification);
        let url = self.send_photo_url();

        for photo in &notification.images {
            let body = SendPhoto {
                chat_id: &self.chat_id,
                photo,
                caption: &caption,
            };
            let response = self
                .client
                .post(&url)
                .json(&body)
                .send()
                .await
                .map_err(|e| NotifyError::Unavailable(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(NotifyError::Rejected(format!("status {}: {}", status, text)));
            }
        }

        tracing::info!(
            count = notification.images.len(),
            session_id = %notification.session_id,
            "Images forwarded to support chat"
        );
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct SendPhoto<'a> {
    chat_id: &'a str,
    photo: &'a str,
    caption: &'a str,
}
