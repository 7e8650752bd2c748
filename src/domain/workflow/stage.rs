//! Stage enum for per-business-type dialogue progress.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{BusinessType, StateMachine};

/// Dialogue stage of a conversation.
///
/// Deposit and withdrawal run AskIdentifier -> GuideImage -> ProcessIdentifier
/// -> Finish. Activity runs ListAndMatch -> Disambiguate -> Finish. Human
/// service starts at Finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    AskIdentifier,
    GuideImage,
    ProcessIdentifier,
    ListAndMatch,
    Disambiguate,
    Finish,
}

impl Stage {
    /// Entry stage of a business type's cycle.
    pub fn initial_for(business_type: BusinessType) -> Stage {
        match business_type {
            BusinessType::Deposit | BusinessType::Withdrawal => Stage::AskIdentifier,
            BusinessType::Activity => Stage::ListAndMatch,
            BusinessType::HumanService | BusinessType::Unset => Stage::Finish,
        }
    }

    /// Progress rank within a cycle. GuideImage shares AskIdentifier's rank
    /// since both are still waiting for an identifier.
    pub fn rank(&self) -> u8 {
        match self {
            Stage::AskIdentifier | Stage::GuideImage | Stage::ListAndMatch => 0,
            Stage::ProcessIdentifier | Stage::Disambiguate => 1,
            Stage::Finish => 2,
        }
    }

    /// True if the stage is part of the business type's workflow.
    pub fn belongs_to(&self, business_type: BusinessType) -> bool {
        match self {
            Stage::AskIdentifier | Stage::GuideImage | Stage::ProcessIdentifier => {
                business_type.uses_identifier()
            }
            Stage::ListAndMatch | Stage::Disambiguate => business_type == BusinessType::Activity,
            Stage::Finish => true,
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            Stage::Finish => Phase::Finish,
            _ => Phase::Working,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::AskIdentifier => "ask_identifier",
            Stage::GuideImage => "guide_image",
            Stage::ProcessIdentifier => "process_identifier",
            Stage::ListAndMatch => "list_and_match",
            Stage::Disambiguate => "disambiguate",
            Stage::Finish => "finish",
        }
    }
}

impl StateMachine for Stage {
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use Stage::*;
        match self {
            AskIdentifier | GuideImage => vec![AskIdentifier, GuideImage, ProcessIdentifier, Finish],
            ProcessIdentifier => vec![ProcessIdentifier, Finish],
            ListAndMatch => vec![ListAndMatch, Disambiguate, Finish],
            Disambiguate => vec![Disambiguate, Finish],
            Finish => vec![],
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarse stage reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Working,
    Finish,
}
