//! Health endpoint.
//!
//! Reports process status and what the server sees at the configured
//! planning file path.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    /// Server status ("healthy").
    pub status: String,
    /// Server version.
    pub version: String,
    /// Configured planning file path.
    pub config_path: String,
    /// Whether anything exists at the path.
    pub exists: bool,
    /// Whether the path is a regular file.
    pub is_file: bool,
    /// Whether the path is a directory.
    pub is_dir: bool,
    /// File size, when the path is a regular file.
    pub size_bytes: Option<u64>,
}

impl HealthResponse {
    /// Inspect `config_path`.
    pub async fn probe(config_path: &Path) -> Self {
        let metadata = tokio::fs::metadata(config_path).await.ok();
        let is_file = metadata.as_ref().is_some_and(|m| m.is_file());
        Self {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            config_path: config_path.display().to_string(),
            exists: metadata.is_some(),
            is_file,
            is_dir: metadata.as_ref().is_some_and(|m| m.is_dir()),
            size_bytes: metadata.filter(|_| is_file).map(|m| m.len()),
        }
    }
}
