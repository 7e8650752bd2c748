//! HTTP DTOs for the turn endpoints.
//!
//! Field names follow the wire format integrators already send: `messages`
//! for the message text, `status` for the logged-in flag (1 logged in,
//! 0 anonymous) and `type` for a preset business type.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::application::handlers::{ProcessTurnCommand, TurnMetadata, TurnResult};
use crate::domain::foundation::{BusinessType, HistoryEntry, Language, SessionId, UserId};
use crate::domain::intent::CategoryHint;
use crate::domain::workflow::{ConversationState, Phase};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Body of `POST /process`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessTurnRequest {
    pub session_id: String,
    pub user_id: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub language: Option<String>,
    /// 1 when the user is logged in, 0 otherwise.
    #[serde(default = "default_logged_in")]
    pub status: i64,
    #[serde(default, rename = "type")]
    pub business_type: Option<String>,
    #[serde(alias = "message")]
    pub messages: String,
    #[serde(default)]
    pub history: Option<Vec<HistoryEntry>>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    /// `{mainCategory: subCategory}`
    #[serde(default)]
    pub category: Option<BTreeMap<String, Option<String>>>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub state: Option<ConversationState>,
    #[serde(default)]
    pub reset: bool,
    #[serde(default = "default_site")]
    pub site: i64,
}

fn default_logged_in() -> i64 {
    1
}

fn default_site() -> i64 {
    1
}

impl ProcessTurnRequest {
    /// Converts to the application command, rejecting values the domain cannot accept.
    pub fn into_command(self) -> Result<ProcessTurnCommand, String> {
        let session_id =
            SessionId::new(self.session_id).map_err(|e| format!("session_id: {}", e))?;
        let user_id = UserId::new(self.user_id).map_err(|e| format!("user_id: {}", e))?;

        let business_type = match self.business_type.as_deref() {
            Some(raw) => raw
                .parse::<BusinessType>()
                .map_err(|e| format!("type: {}", e))?,
            None => BusinessType::Unset,
        };

        let language = match self.language.as_deref() {
            Some(raw) => raw.parse::<Language>().unwrap_or_else(|_| {
                tracing::debug!(language = raw, "Unsupported language, using default");
                Language::default()
            }),
            None => Language::default(),
        };

        let category = self.category.and_then(|map| {
            map.into_iter().next().map(|(main, sub)| {
                let sub = sub.filter(|s| !s.trim().is_empty());
                CategoryHint::new(main, sub)
            })
        });

        Ok(ProcessTurnCommand {
            session_id,
            user_id,
            platform: self.platform,
            language,
            logged_in: self.status != 0,
            message: self.messages,
            history: self.history.unwrap_or_default(),
            images: self.images.unwrap_or_default(),
            category,
            business_type,
            token: self.token,
            state: self.state,
            reset: self.reset,
            site: self.site,
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Body returned by `POST /process`.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessTurnResponse {
    pub session_id: String,
    pub status: &'static str,
    pub response: String,
    pub stage: Phase,
    #[serde(rename = "type")]
    pub business_type: BusinessType,
    /// 1 when the conversation must go to a human agent.
    pub transfer_human: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    pub site: i64,
    pub state: Option<ConversationState>,
    pub metadata: TurnMetadata,
}

impl From<TurnResult> for ProcessTurnResponse {
    fn from(result: TurnResult) -> Self {
        let transfer_human = u8::from(result.transfer_human());
        Self {
            session_id: result.session_id.to_string(),
            status: "success",
            response: result.response,
            stage: result.phase,
            business_type: result.business_type,
            transfer_human,
            images: (!result.images.is_empty()).then_some(result.images),
            site: result.site,
            state: result.state,
            metadata: result.metadata,
        }
    }
}

/// Body returned by `POST /reload_config`.
#[derive(Debug, Clone, Serialize)]
pub struct ReloadResponse {
    pub status: &'static str,
    pub message: String,
    pub business_types_count: usize,
}

/// Body returned by `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub timestamp: i64,
}

/// Error body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self {
            code: "UNAUTHORIZED".to_string(),
            message: reason.into(),
        }
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self {
            code: "UNPROCESSABLE_ENTITY".to_string(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: "INTERNAL_ERROR".to_string(),
            message: message.into(),
        }
    }
}
