//! Intent classification.
//!
//! Determines the active business type of a turn through an ordered chain of
//! strategies, each of which either decides or defers.

mod classifier;
mod strategies;
mod strategy;

pub use classifier::IntentClassifier;
pub use strategies::{AssignedTypeStrategy, CategoryHintStrategy, KeywordStrategy, SemanticStrategy};
pub use strategy::{
    CategoryHint, ClassifierStrategy, DecisionSource, IntentDecision, IntentError, IntentInput,
    Resolution,
};
