//! Workflow state machine.
//!
//! - `stage` - the `Stage` enum and its forward-only transition table
//! - `state` - `ConversationState`, the caller-held cycle value
//! - `tracker` - pure per-turn stage logic
//! - `interrupt` - the image override that runs before everything else

mod interrupt;
mod stage;
mod state;
mod tracker;

pub use interrupt::ImageInterrupt;
pub use stage::{Phase, Stage};
pub use state::{ConversationState, Slots};
pub use tracker::{
    Cycle, ListResolution, PendingQuery, PlannedQuery, QueryResolution, Reply, StageInput,
    StagePlan, StageTracker, Transition,
};
