//! Backend traits and request shapes for the persistence adapter.
//!
//! The two interchangeable backends (remote REST API, local durable store)
//! implement these traits; the note store only ever talks to the traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::metadata::Metadata;
use crate::models::{Attachment, Catalog, FilterState, Note, NoteType};

// =============================================================================
// REQUEST SHAPES
// =============================================================================

/// Fields for a note about to be created.
///
/// The store stamps id and timestamps before handing this to a backend.
#[derive(Debug, Clone, Default)]
pub struct NewNote {
    pub note_type: NoteType,
    pub title: String,
    pub content: String,
    pub metadata: Metadata,
    pub tags: Vec<String>,
    pub catalog_id: Option<Uuid>,
    pub attachments: Vec<Attachment>,
}

/// Partial note update. Only supplied fields change.
#[derive(Debug, Clone, Default)]
pub struct NoteChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub note_type: Option<NoteType>,
    pub metadata: Option<Metadata>,
    pub tags: Option<Vec<String>>,
    pub catalog_id: Option<Uuid>,
    pub attachments: Option<Vec<Attachment>>,
    pub is_archived: Option<bool>,
    /// Client-stamped update time; the authoritative side may override it.
    pub updated_at: Option<DateTime<Utc>>,
}

impl NoteChanges {
    /// A change that only toggles the archived flag.
    pub fn archive(flag: bool) -> Self {
        Self {
            is_archived: Some(flag),
            ..Default::default()
        }
    }

    /// Apply these changes to a note in place.
    ///
    /// Does not touch `updated_at`; refreshing it is the storage side's job.
    pub fn apply_to(&self, note: &mut Note) {
        if let Some(title) = &self.title {
            note.title = title.clone();
        }
        if let Some(content) = &self.content {
            note.content = content.clone();
        }
        if let Some(note_type) = &self.note_type {
            note.note_type = note_type.clone();
        }
        if let Some(metadata) = &self.metadata {
            note.metadata = metadata.clone();
        }
        if let Some(tags) = &self.tags {
            note.tags = tags.clone();
        }
        if let Some(catalog_id) = self.catalog_id {
            note.catalog_id = Some(catalog_id);
        }
        if let Some(attachments) = &self.attachments {
            note.attachments = attachments.clone();
        }
        if let Some(is_archived) = self.is_archived {
            note.is_archived = is_archived;
        }
    }
}

/// Partial catalog update.
#[derive(Debug, Clone, Default)]
pub struct CatalogChanges {
    pub name: Option<String>,
    /// `None` leaves the parent untouched, `Some(None)` moves the catalog
    /// to the top level, `Some(Some(id))` re-parents it.
    pub parent_id: Option<Option<Uuid>>,
}

/// A file handed to the attachment backend for upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    /// MIME type.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

// =============================================================================
// BACKEND TRAITS
// =============================================================================

/// CRUD contract for notes, uniform across backends.
#[async_trait]
pub trait NoteBackend: Send + Sync {
    /// List notes matching the filter, newest update first.
    async fn list(&self, filter: &FilterState) -> Result<Vec<Note>>;

    /// Fetch one note. Fails with `NotFound` when absent.
    async fn get(&self, id: Uuid) -> Result<Note>;

    /// Persist a new note; returns the canonical stored form.
    async fn create(&self, note: Note) -> Result<Note>;

    /// Partially update a note; returns the canonical stored form with a
    /// refreshed `updated_at`.
    async fn update(&self, id: Uuid, changes: NoteChanges) -> Result<Note>;

    /// Delete a note. A second delete of the same id is success or
    /// `NotFound` depending on backend, never anything worse.
    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// CRUD contract for catalogs.
#[async_trait]
pub trait CatalogBackend: Send + Sync {
    async fn list(&self) -> Result<Vec<Catalog>>;

    /// Persist a new catalog; the backend assigns or confirms the id.
    async fn create(&self, catalog: Catalog) -> Result<Catalog>;

    async fn update(&self, id: Uuid, changes: CatalogChanges) -> Result<Catalog>;

    /// Delete a catalog. Fails when the catalog still contains notes.
    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// Attachment upload/removal contract.
#[async_trait]
pub trait AttachmentBackend: Send + Sync {
    /// Upload a file, optionally bound to a note.
    ///
    /// The remote backend performs a multipart upload and returns a server
    /// URL; the local backend inline-encodes the bytes and returns them
    /// immediately (with simulated latency).
    async fn upload(&self, file: UploadFile, note_id: Option<Uuid>) -> Result<Attachment>;

    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// Opaque AI tag suggestion, consumed as a collaborator interface.
#[async_trait]
pub trait TagSuggester: Send + Sync {
    async fn suggest_tags(&self, content: &str) -> Result<Vec<String>>;
}
