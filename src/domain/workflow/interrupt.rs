//! Image interrupt: attached media forces a human handoff.

use super::{ConversationState, Transition};
use crate::domain::foundation::BusinessType;

pub struct ImageInterrupt;

impl ImageInterrupt {
    /// Returns the forced handoff when the turn carries images.
    ///
    /// Runs before any other logic and ignores stage edges. The business type
    /// is kept; a conversation without one becomes a human service cycle.
    pub fn apply(prior: Option<&ConversationState>, images: &[String]) -> Option<Transition> {
        if images.is_empty() {
            return None;
        }
        let state = prior
            .filter(|s| s.business_type.is_set())
            .cloned()
            .unwrap_or_else(|| ConversationState::start(BusinessType::HumanService));
        Some(Transition::forced_handoff(state))
    }
}
