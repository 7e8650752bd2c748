//! ReloadCatalogHandler - swaps in the workflow catalog from its source file.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::catalog::CatalogError;
use crate::ports::CatalogProvider;

/// Result of a successful reload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReloadCatalogResult {
    pub business_types_count: usize,
    pub category_routes_count: usize,
}

pub struct ReloadCatalogHandler {
    catalog: Arc<dyn CatalogProvider>,
}

impl ReloadCatalogHandler {
    pub fn new(catalog: Arc<dyn CatalogProvider>) -> Self {
        Self { catalog }
    }

    /// Reloads the catalog. On failure the previous catalog stays in effect.
    pub fn handle(&self) -> Result<ReloadCatalogResult, CatalogError> {
        let catalog = self.catalog.reload()?;
        Ok(ReloadCatalogResult {
            business_types_count: catalog.business_types.len(),
            category_routes_count: catalog.category_routes.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::catalog::CatalogStore;
    use crate::domain::catalog::WorkflowCatalog;

    const CATALOG: &str = include_str!("../../../config/workflow.yaml");

    #[test]
    fn reload_reports_counts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workflow.yaml");
        std::fs::write(&path, CATALOG).unwrap();

        let handler = ReloadCatalogHandler::new(Arc::new(CatalogStore::load(&path).unwrap()));
        let result = handler.handle().unwrap();
        assert_eq!(result.business_types_count, 4);
        assert_eq!(result.category_routes_count, 5);
    }

    #[test]
    fn in_memory_catalog_cannot_reload() {
        let catalog = WorkflowCatalog::from_yaml_str(CATALOG).unwrap();
        let handler = ReloadCatalogHandler::new(Arc::new(CatalogStore::from_catalog(catalog)));
        assert!(matches!(handler.handle(), Err(CatalogError::NoSource)));
    }
}
