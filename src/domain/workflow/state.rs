//! Conversation state carried by the caller between turns.

use serde::{Deserialize, Serialize};

use super::Stage;
use crate::domain::extraction::Identifier;
use crate::domain::foundation::BusinessType;
use crate::domain::outcome::ActivityRef;

/// Values collected during the current cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Slots {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Identifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<ActivityRef>,
    /// Identifier the backend reported as not found; not re-read from history.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected: Option<Identifier>,
    #[serde(default)]
    pub failed_matches: u8,
}

/// One business-type cycle. The engine returns an updated value every turn
/// but never stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    pub business_type: BusinessType,
    pub stage: Stage,
    #[serde(default)]
    pub slots: Slots,
}

impl ConversationState {
    /// Fresh cycle at the business type's entry stage.
    pub fn start(business_type: BusinessType) -> Self {
        Self {
            business_type,
            stage: Stage::initial_for(business_type),
            slots: Slots::default(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.stage == Stage::Finish
    }

    /// True when the stage is part of the business type's workflow.
    pub fn is_consistent(&self) -> bool {
        self.business_type.is_set() && self.stage.belongs_to(self.business_type)
    }

    pub(crate) fn at(&self, stage: Stage) -> Self {
        Self {
            stage,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_uses_entry_stage() {
        let state = ConversationState::start(BusinessType::Withdrawal);
        assert_eq!(state.stage, Stage::AskIdentifier);
        assert_eq!(state.slots, Slots::default());
        assert!(!state.is_finished());
    }

    #[test]
    fn inconsistent_states_are_detected() {
        let state = ConversationState {
            business_type: BusinessType::Activity,
            stage: Stage::ProcessIdentifier,
            slots: Slots::default(),
        };
        assert!(!state.is_consistent());
        assert!(ConversationState::start(BusinessType::Activity).is_consistent());
    }

    #[test]
    fn deserializes_from_caller_json() {
        let state: ConversationState = serde_json::from_str(
            r#"{"business_type":"S001","stage":"process_identifier","slots":{"identifier":"123456789012345678"}}"#,
        )
        .unwrap();
        assert_eq!(state.business_type, BusinessType::Deposit);
        assert_eq!(state.slots.identifier.unwrap().as_str(), "123456789012345678");
    }

    #[test]
    fn rejects_malformed_identifier_slot() {
        let result = serde_json::from_str::<ConversationState>(
            r#"{"business_type":"S001","stage":"process_identifier","slots":{"identifier":"12"}}"#,
        );
        assert!(result.is_err());
    }
}
