//! Application configuration consumed by the sync layer.
//!
//! The configuration is supplied and persisted by the host application; the
//! sync layer only reads it. A single boolean switches every operation (notes,
//! catalogs, attachments, tag suggestion) between the remote REST API and the
//! local durable store.

use serde::{Deserialize, Serialize};

use crate::defaults;

/// Backend selection and remote endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// When true, all persistence goes through the remote REST API;
    /// otherwise the local durable store is used.
    pub use_remote_api: bool,
    /// Base URL of the remote REST API.
    pub api_base_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            use_remote_api: false,
            api_base_url: defaults::API_BASE_URL.to_string(),
        }
    }
}

impl AppConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `OMNI_USE_REMOTE_API` | `false` | Route persistence to the remote API |
    /// | `OMNI_API_BASE_URL` | `http://localhost:7200` | Remote API base URL |
    pub fn from_env() -> Self {
        let use_remote_api = std::env::var("OMNI_USE_REMOTE_API")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let api_base_url = std::env::var("OMNI_API_BASE_URL")
            .unwrap_or_else(|_| defaults::API_BASE_URL.to_string());

        Self {
            use_remote_api,
            api_base_url,
        }
    }

    /// Resolve an attachment `data` value to a displayable URL.
    ///
    /// Inline data URLs and absolute HTTP(S) URLs pass through untouched;
    /// relative backend paths are joined with the configured base URL.
    pub fn resolve_attachment_url(&self, data: &str) -> String {
        if data.is_empty() {
            return String::new();
        }
        if data.starts_with("data:") || data.starts_with("http") {
            return data.to_string();
        }
        let clean = data.strip_prefix('/').unwrap_or(data);
        format!("{}/{}", self.api_base_url.trim_end_matches('/'), clean)
    }
}
