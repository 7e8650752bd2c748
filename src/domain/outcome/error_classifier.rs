//! Separates user-input errors from system errors after a backend query.

use serde::Serialize;

use super::{QueryEnvelope, QueryError, STATE_OK};

/// Error taxonomy of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Recoverable in place; the engine re-prompts at the current stage.
    UserInput,
    /// Always escalates to a human.
    System,
    /// No state code to judge by; handled like a system error.
    Unclassified,
}

impl ErrorClass {
    pub fn escalates(&self) -> bool {
        !matches!(self, ErrorClass::UserInput)
    }
}

/// Shape the payload must have for the query to count as well-formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedPayload {
    Status,
    ActivityList,
}

/// Classifies backend results using the configured reserved state codes.
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    reserved_codes: Vec<i64>,
}

impl ErrorClassifier {
    pub fn new(reserved_codes: Vec<i64>) -> Self {
        Self { reserved_codes }
    }

    /// Returns `None` when the result is usable, otherwise its error class.
    ///
    /// Precedence: a failed upstream extraction, then transport failure,
    /// then the state code, then the payload shape.
    pub fn classify(
        &self,
        result: &Result<QueryEnvelope, QueryError>,
        expected: ExpectedPayload,
        extraction_failed: bool,
    ) -> Option<ErrorClass> {
        if extraction_failed {
            return Some(ErrorClass::UserInput);
        }

        let envelope = match result {
            Ok(envelope) => envelope,
            Err(_) => return Some(ErrorClass::System),
        };

        let state = match envelope.state {
            Some(state) => state,
            None => return Some(ErrorClass::Unclassified),
        };

        if self.reserved_codes.contains(&state) {
            return Some(ErrorClass::UserInput);
        }
        if state != STATE_OK {
            return Some(ErrorClass::System);
        }

        let well_formed = match expected {
            ExpectedPayload::Status => envelope.status().is_some(),
            ExpectedPayload::ActivityList => envelope.activities().is_some(),
        };
        if well_formed {
            None
        } else {
            Some(ErrorClass::System)
        }
    }
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new(vec![1001])
    }
}
