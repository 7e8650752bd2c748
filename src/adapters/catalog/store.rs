//! File-backed workflow catalog with atomic hot reload.
//!
//! The current catalog sits behind a `RwLock<Arc<_>>`. Readers clone the `Arc`
//! and release the lock immediately; a reload parses and validates the new
//! file completely before the swap, so a broken edit never replaces a working
//! catalog.

use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::catalog::{CatalogError, WorkflowCatalog};
use crate::ports::CatalogProvider;

pub struct CatalogStore {
    current: RwLock<Arc<WorkflowCatalog>>,
    source: Option<PathBuf>,
}

impl CatalogStore {
    /// Loads the catalog at `path` and remembers the path for reloads.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref().to_path_buf();
        let catalog = read_catalog(&path)?;
        tracing::info!(
            path = %path.display(),
            profiles = catalog.business_types.len(),
            "Workflow catalog loaded"
        );
        Ok(Self {
            current: RwLock::new(Arc::new(catalog)),
            source: Some(path),
        })
    }

    /// Wraps an in-memory catalog. Reloading such a store fails with `NoSource`.
    pub fn from_catalog(catalog: WorkflowCatalog) -> Self {
        Self {
            current: RwLock::new(Arc::new(catalog)),
            source: None,
        }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

fn read_catalog(path: &Path) -> Result<WorkflowCatalog, CatalogError> {
    let yaml = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;
    WorkflowCatalog::from_yaml_str(&yaml)
}

impl CatalogProvider for CatalogStore {
    fn snapshot(&self) -> Arc<WorkflowCatalog> {
        Arc::clone(&self.current.read())
    }

    fn reload(&self) -> Result<Arc<WorkflowCatalog>, CatalogError> {
        let path = self.source.as_deref().ok_or(CatalogError::NoSource)?;
        let catalog = match read_catalog(path) {
            Ok(catalog) => Arc::new(catalog),
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Catalog reload failed; keeping current catalog");
                return Err(e);
            }
        };

        *self.current.write() = Arc::clone(&catalog);
        tracing::info!(path = %path.display(), "Workflow catalog reloaded");
        Ok(catalog)
    }
}
