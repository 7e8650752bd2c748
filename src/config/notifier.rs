//! Image notification (Telegram) configuration

use serde::Deserialize;

/// Telegram settings; when either value is missing images are only logged.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct NotifierConfig {
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
}

impl NotifierConfig {
    /// Bot token and chat id when both are present.
    pub fn telegram(&self) -> Option<(&str, &str)> {
        match (&self.telegram_bot_token, &self.telegram_chat_id) {
            (Some(token), Some(chat)) if !token.is_empty() && !chat.is_empty() => {
                Some((token.as_str(), chat.as_str()))
            }
            _ => None,
        }
    }
}
