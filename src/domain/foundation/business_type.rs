//! BusinessType enum identifying which support workflow a session is in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// The workflow a conversation is currently routed to.
///
/// Serialized with the platform's wire codes (`S001`, `S002`, `S003`,
/// `human_service`, `unset`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BusinessType {
    #[serde(rename = "S001")]
    Deposit,
    #[serde(rename = "S002")]
    Withdrawal,
    #[serde(rename = "S003")]
    Activity,
    #[serde(rename = "human_service")]
    HumanService,
    #[default]
    #[serde(rename = "unset")]
    Unset,
}

impl BusinessType {
    /// Returns the wire code.
    pub fn code(&self) -> &'static str {
        match self {
            BusinessType::Deposit => "S001",
            BusinessType::Withdrawal => "S002",
            BusinessType::Activity => "S003",
            BusinessType::HumanService => "human_service",
            BusinessType::Unset => "unset",
        }
    }

    /// Returns the label used with the semantic classification service.
    pub fn semantic_label(&self) -> &'static str {
        match self {
            BusinessType::Deposit => "deposit",
            BusinessType::Withdrawal => "withdrawal",
            BusinessType::Activity => "activity",
            BusinessType::HumanService => "human_service",
            BusinessType::Unset => "none",
        }
    }

    /// Maps a semantic label back to a business type. `none` maps to `None`.
    pub fn from_semantic_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "deposit" => Some(BusinessType::Deposit),
            "withdrawal" => Some(BusinessType::Withdrawal),
            "activity" => Some(BusinessType::Activity),
            "human_service" => Some(BusinessType::HumanService),
            _ => None,
        }
    }

    /// Returns true for workflows that ask the user for an order identifier.
    pub fn uses_identifier(&self) -> bool {
        matches!(self, BusinessType::Deposit | BusinessType::Withdrawal)
    }

    pub fn is_set(&self) -> bool {
        !matches!(self, BusinessType::Unset)
    }
}

impl FromStr for BusinessType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "S001" => Ok(BusinessType::Deposit),
            "S002" => Ok(BusinessType::Withdrawal),
            "S003" => Ok(BusinessType::Activity),
            "human_service" => Ok(BusinessType::HumanService),
            "unset" | "" => Ok(BusinessType::Unset),
            other => Err(ValidationError::invalid_format(
                "business_type",
                format!("unknown business type code '{}'", other),
            )),
        }
    }
}

impl fmt::Display for BusinessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
