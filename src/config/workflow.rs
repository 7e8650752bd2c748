//! Workflow catalog location

use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowConfig {
    /// YAML catalog loaded at startup and on `POST /reload_config`
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
        }
    }
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("config/workflow.yaml")
}
