//! Workflow catalog storage.

mod store;

pub use store::CatalogStore;
