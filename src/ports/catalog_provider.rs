//! Catalog Provider Port - supplies the current workflow catalog.
//!
//! Readers take an `Arc` snapshot at the start of a turn and use it for the
//! whole turn, so a concurrent reload never shows them a mix of old and new
//! tables.

use std::sync::Arc;

use crate::domain::catalog::{CatalogError, WorkflowCatalog};

pub trait CatalogProvider: Send + Sync {
    /// The catalog currently in effect.
    fn snapshot(&self) -> Arc<WorkflowCatalog>;

    /// Reload from the source and swap atomically. The old catalog stays in
    /// effect when the new one fails to load or validate.
    fn reload(&self) -> Result<Arc<WorkflowCatalog>, CatalogError>;
}
