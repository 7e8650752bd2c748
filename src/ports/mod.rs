//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `OrderQueryService` - order and activity status backend
//! - `SemanticClassifier` - model-based classification into a closed label set
//! - `ImageNotifier` - forwards attached images to human agents
//! - `CatalogProvider` - current workflow catalog snapshot, reloadable

mod catalog_provider;
mod image_notifier;
mod order_query_service;
mod semantic_classifier;

pub use catalog_provider::CatalogProvider;
pub use image_notifier::{ImageNotification, ImageNotifier, NotifyError};
pub use order_query_service::{OrderQueryService, QueryKind, QueryRequest};
pub use semantic_classifier::{
    ClassifierError, SemanticClassifier, SemanticLabel, SemanticRequest, NONE_LABEL,
};
