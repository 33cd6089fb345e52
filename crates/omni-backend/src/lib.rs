//! # omni-backend
//!
//! The two interchangeable persistence backends for Omni Notes and the
//! [`Backend`] aggregate that selects between them:
//!
//! - [`RemoteBackend`] — REST client for the notes server, with wire DTO
//!   translation
//! - [`LocalBackend`] — durable file-backed store with client-side
//!   filtering and simulated latencies

pub mod local;
pub mod remote;
pub mod seed;
pub mod storage;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use omni_core::{
    AppConfig, AttachmentBackend, CatalogBackend, NoteBackend, Result, TagSuggester,
};

pub use local::LocalBackend;
pub use remote::RemoteBackend;
pub use storage::JsonStore;

/// Which persistence side a [`Backend`] is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Remote,
    Local,
}

/// The full set of persistence capabilities behind one switch.
///
/// The store holds one of these and never needs to know which side it is
/// talking to; the trait objects all point at the same underlying backend.
#[derive(Clone)]
pub struct Backend {
    kind: BackendKind,
    notes: Arc<dyn NoteBackend>,
    catalogs: Arc<dyn CatalogBackend>,
    attachments: Arc<dyn AttachmentBackend>,
    tag_suggester: Arc<dyn TagSuggester>,
}

impl Backend {
    /// Backend bound to the remote REST API.
    pub fn remote(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        info!(base_url = %base_url, "using remote backend");
        let inner = Arc::new(RemoteBackend::new(base_url)?);
        Ok(Self {
            kind: BackendKind::Remote,
            notes: inner.clone(),
            catalogs: inner.clone(),
            attachments: inner.clone(),
            tag_suggester: inner,
        })
    }

    /// Backend bound to a local data directory, seeded on first open.
    pub fn local(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let inner = LocalBackend::open(data_dir)?;
        inner.seed()?;
        info!("using local backend");
        let inner = Arc::new(inner);
        Ok(Self {
            kind: BackendKind::Local,
            notes: inner.clone(),
            catalogs: inner.clone(),
            attachments: inner.clone(),
            tag_suggester: inner,
        })
    }

    /// Select the backend from application configuration.
    pub fn from_config(config: &AppConfig, data_dir: impl Into<PathBuf>) -> Result<Self> {
        if config.use_remote_api {
            Self::remote(config.api_base_url.clone())
        } else {
            Self::local(data_dir)
        }
    }

    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    pub fn is_remote(&self) -> bool {
        self.kind == BackendKind::Remote
    }

    pub fn notes(&self) -> &Arc<dyn NoteBackend> {
        &self.notes
    }

    pub fn catalogs(&self) -> &Arc<dyn CatalogBackend> {
        &self.catalogs
    }

    pub fn attachments(&self) -> &Arc<dyn AttachmentBackend> {
        &self.attachments
    }

    pub fn tag_suggester(&self) -> &Arc<dyn TagSuggester> {
        &self.tag_suggester
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend").field("kind", &self.kind).finish()
    }
}
