//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - semantic classification (OpenAI-compatible, mock)
//! - `backend` - order/activity query backend (HTTP, mock)
//! - `notification` - image forwarding (Telegram, logging, recording)
//! - `catalog` - file-backed workflow catalog with hot reload
//! - `http` - axum routes for the turn API

pub mod ai;
pub mod backend;
pub mod catalog;
pub mod http;
pub mod notification;

pub use ai::{MockSemanticClassifier, OpenAiClassifierConfig, OpenAiSemanticClassifier};
pub use backend::{HttpOrderQueryService, MockOrderQueryService};
pub use catalog::CatalogStore;
pub use notification::{LoggingNotifier, RecordingNotifier, TelegramNotifier};
