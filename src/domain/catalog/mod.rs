//! Workflow catalog: the runtime-swappable business configuration.

mod errors;
mod model;

pub use errors::CatalogError;
pub use model::{
    BusinessProfile, CategoryRoute, ClassificationSettings, IdentifierSettings, LocalizedText,
    PhraseTable, RouteTarget, SignalPhrases, WorkflowCatalog,
};
