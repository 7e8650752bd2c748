//! Fixed-length order identifier extraction from free text.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{HistoryEntry, ValidationError};

/// Required number of digits in an order identifier.
pub const IDENTIFIER_LENGTH: usize = 18;

/// An order reference of exactly [`IDENTIFIER_LENGTH`] ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.len() != IDENTIFIER_LENGTH {
            return Err(ValidationError::invalid_length(
                "identifier",
                IDENTIFIER_LENGTH,
                value.chars().count(),
            ));
        }
        if !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::invalid_format(
                "identifier",
                "must contain only ASCII digits",
            ));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Identifier {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Returns the maximal runs of consecutive ASCII digits in scan order.
pub fn digit_runs(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut runs = Vec::new();
    let mut start = None;

    for (i, b) in bytes.iter().enumerate() {
        match (b.is_ascii_digit(), start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                runs.push(&text[s..i]);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push(&text[s..]);
    }
    runs
}

/// Pulls an order identifier out of the current message and recent history.
#[derive(Debug, Clone, Copy)]
pub struct IdentifierExtractor {
    history_window: usize,
    attempt_min_digits: usize,
}

impl IdentifierExtractor {
    pub fn new(history_window: usize, attempt_min_digits: usize) -> Self {
        Self {
            history_window,
            attempt_min_digits,
        }
    }

    /// First valid identifier in a single text, by scan order.
    pub fn find_in(text: &str) -> Option<Identifier> {
        digit_runs(text)
            .into_iter()
            .find(|run| run.len() == IDENTIFIER_LENGTH)
            .map(|run| Identifier(run.to_string()))
    }

    /// Scans the message, then user history entries newest first.
    ///
    /// Sources are scanned one at a time so digits never join across them.
    pub fn extract(&self, message: &str, history: &[HistoryEntry]) -> Option<Identifier> {
        self.extract_excluding(message, history, None)
    }

    /// Like [`extract`](Self::extract), but history hits equal to `rejected`
    /// are skipped. A rejected number typed again in the message is accepted.
    pub fn extract_excluding(
        &self,
        message: &str,
        history: &[HistoryEntry],
        rejected: Option<&Identifier>,
    ) -> Option<Identifier> {
        if let Some(found) = Self::find_in(message) {
            return Some(found);
        }

        history
            .iter()
            .rev()
            .filter(|entry| entry.is_user())
            .take(self.history_window)
            .filter_map(|entry| Self::find_in(&entry.content))
            .find(|found| Some(found) != rejected)
    }

    /// True when the message holds a long digit run that is not a valid identifier.
    ///
    /// Used to pick the corrective prompt over the plain request.
    pub fn has_malformed_attempt(&self, message: &str) -> bool {
        digit_runs(message)
            .into_iter()
            .any(|run| run.len() >= self.attempt_min_digits && run.len() != IDENTIFIER_LENGTH)
    }
}

impl Default for IdentifierExtractor {
    fn default() -> Self {
        Self::new(3, 12)
    }
}
