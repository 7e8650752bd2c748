//! Image notification adapters.
//!
//! - `TelegramNotifier` - forwards images to a Telegram support chat
//! - `LoggingNotifier` - logs only, used when no channel is configured
//! - `RecordingNotifier` - captures dispatches for tests

mod recording;
mod telegram;

pub use recording::{LoggingNotifier, RecordingNotifier};
pub use telegram::TelegramNotifier;
