//! Local durable persistence backend.
//!
//! Stores the notes and catalogs collections as JSON under fixed keys and
//! performs all filtering client-side, in memory. Every operation is wrapped
//! in a small artificial latency so UI code exercises the same asynchronous
//! paths it would against the remote API.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{Duration as ChronoDuration, Utc};
use tokio::time::sleep;
use tracing::debug;
use uuid::Uuid;

use omni_core::{
    defaults, generate_id, text_value, Attachment, AttachmentBackend, Catalog, CatalogBackend,
    CatalogChanges, Error, FilterState, Note, NoteBackend, NoteChanges, Result, TagSuggester,
    UploadFile,
};

use crate::seed;
use crate::storage::JsonStore;

/// Local backend over a [`JsonStore`].
#[derive(Debug, Clone)]
pub struct LocalBackend {
    store: JsonStore,
}

impl LocalBackend {
    /// Open the local backend with its data directory.
    pub fn open(dir: impl Into<std::path::PathBuf>) -> Result<Self> {
        Ok(Self {
            store: JsonStore::open(dir)?,
        })
    }

    /// Write starter content, only where the keys are still absent.
    pub fn seed(&self) -> Result<()> {
        if !self.store.contains(defaults::CATALOGS_STORAGE_KEY) {
            let catalogs = seed::initial_catalogs();
            let notes = seed::initial_notes(&catalogs);
            self.store.write(defaults::CATALOGS_STORAGE_KEY, &catalogs)?;
            if !self.store.contains(defaults::NOTES_STORAGE_KEY) {
                self.store.write(defaults::NOTES_STORAGE_KEY, &notes)?;
            }
        }
        Ok(())
    }

    fn read_notes(&self) -> Result<Vec<Note>> {
        self.store.read(defaults::NOTES_STORAGE_KEY)
    }

    fn write_notes(&self, notes: &[Note]) -> Result<()> {
        self.store.write(defaults::NOTES_STORAGE_KEY, notes)
    }

    fn read_catalogs(&self) -> Result<Vec<Catalog>> {
        self.store.read(defaults::CATALOGS_STORAGE_KEY)
    }

    fn write_catalogs(&self, catalogs: &[Catalog]) -> Result<()> {
        self.store.write(defaults::CATALOGS_STORAGE_KEY, catalogs)
    }
}

/// Whether a note matches the filter, using the same criteria the remote
/// backend applies server-side.
pub fn note_matches_filter(note: &Note, filter: &FilterState) -> bool {
    if note.is_archived != filter.is_archived {
        return false;
    }

    let q = filter.query.to_lowercase();
    if !q.is_empty() {
        let in_title = note.title.to_lowercase().contains(&q);
        let in_content = note.content.to_lowercase().contains(&q);
        let in_tags = note.tags.iter().any(|t| t.to_lowercase().contains(&q));
        let in_solution = text_value(&note.metadata, omni_core::metadata::keys::SOLUTION)
            .map(|s| s.to_lowercase().contains(&q))
            .unwrap_or(false);
        let in_url = text_value(&note.metadata, omni_core::metadata::keys::URL)
            .map(|s| s.to_lowercase().contains(&q))
            .unwrap_or(false);
        if !(in_title || in_content || in_tags || in_solution || in_url) {
            return false;
        }
    }

    if let Some(note_type) = &filter.note_type {
        if &note.note_type != note_type {
            return false;
        }
    }
    if let Some(catalog_id) = filter.catalog_id {
        if note.catalog_id != Some(catalog_id) {
            return false;
        }
    }
    if let Some(tag) = &filter.tag {
        if !note.tags.contains(tag) {
            return false;
        }
    }

    if let Some(start) = filter.start_date {
        if note.updated_at < start {
            return false;
        }
    }
    if let Some(end) = filter.end_date {
        // End date is inclusive as a day: exclusive bound at +1 day.
        if note.updated_at >= end + ChronoDuration::days(1) {
            return false;
        }
    }

    true
}

#[async_trait]
impl NoteBackend for LocalBackend {
    async fn list(&self, filter: &FilterState) -> Result<Vec<Note>> {
        sleep(Duration::from_millis(defaults::LOCAL_LIST_LATENCY_MS)).await;

        let mut notes = self.read_notes()?;
        notes.retain(|n| note_matches_filter(n, filter));
        notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        debug!(count = notes.len(), "local note list");
        Ok(notes)
    }

    async fn get(&self, id: Uuid) -> Result<Note> {
        sleep(Duration::from_millis(defaults::LOCAL_GET_LATENCY_MS)).await;

        self.read_notes()?
            .into_iter()
            .find(|n| n.id == id)
            .ok_or_else(|| Error::NotFound(format!("note {id}")))
    }

    async fn create(&self, mut note: Note) -> Result<Note> {
        sleep(Duration::from_millis(defaults::LOCAL_CREATE_LATENCY_MS)).await;

        if note.id.is_nil() {
            note.id = generate_id();
        }
        let mut notes = self.read_notes()?;
        notes.insert(0, note.clone());
        self.write_notes(&notes)?;
        Ok(note)
    }

    async fn update(&self, id: Uuid, changes: NoteChanges) -> Result<Note> {
        sleep(Duration::from_millis(defaults::LOCAL_WRITE_LATENCY_MS)).await;

        let mut notes = self.read_notes()?;
        let note = notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| Error::NotFound(format!("note {id}")))?;

        changes.apply_to(note);
        // The local store is the authoritative side for update time.
        note.updated_at = Utc::now();
        let updated = note.clone();

        self.write_notes(&notes)?;
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sleep(Duration::from_millis(defaults::LOCAL_WRITE_LATENCY_MS)).await;

        let mut notes = self.read_notes()?;
        notes.retain(|n| n.id != id);
        self.write_notes(&notes)
    }
}

#[async_trait]
impl CatalogBackend for LocalBackend {
    async fn list(&self) -> Result<Vec<Catalog>> {
        sleep(Duration::from_millis(defaults::LOCAL_GET_LATENCY_MS)).await;
        self.read_catalogs()
    }

    async fn create(&self, mut catalog: Catalog) -> Result<Catalog> {
        sleep(Duration::from_millis(defaults::LOCAL_WRITE_LATENCY_MS)).await;

        if catalog.id.is_nil() {
            catalog.id = generate_id();
        }
        let mut catalogs = self.read_catalogs()?;
        catalogs.push(catalog.clone());
        self.write_catalogs(&catalogs)?;
        Ok(catalog)
    }

    async fn update(&self, id: Uuid, changes: CatalogChanges) -> Result<Catalog> {
        sleep(Duration::from_millis(defaults::LOCAL_WRITE_LATENCY_MS)).await;

        let mut catalogs = self.read_catalogs()?;
        let catalog = catalogs
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| Error::NotFound(format!("catalog {id}")))?;

        if let Some(name) = changes.name {
            catalog.name = name;
        }
        if let Some(parent_id) = changes.parent_id {
            catalog.parent_id = parent_id;
        }
        let updated = catalog.clone();

        self.write_catalogs(&catalogs)?;
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sleep(Duration::from_millis(defaults::LOCAL_WRITE_LATENCY_MS)).await;

        let notes = self.read_notes()?;
        if notes.iter().any(|n| n.catalog_id == Some(id)) {
            return Err(Error::Validation(format!(
                "catalog {id} still contains notes"
            )));
        }

        let mut catalogs = self.read_catalogs()?;
        catalogs.retain(|c| c.id != id);
        self.write_catalogs(&catalogs)
    }
}

#[async_trait]
impl AttachmentBackend for LocalBackend {
    async fn upload(&self, file: UploadFile, _note_id: Option<Uuid>) -> Result<Attachment> {
        sleep(Duration::from_millis(defaults::LOCAL_UPLOAD_LATENCY_MS)).await;

        let data = format!(
            "data:{};base64,{}",
            file.content_type,
            BASE64.encode(&file.bytes)
        );
        Ok(Attachment {
            id: generate_id(),
            name: file.name,
            content_type: file.content_type,
            data,
        })
    }

    async fn delete(&self, _id: Uuid) -> Result<()> {
        // Inline attachments live inside their note; nothing else to remove.
        Ok(())
    }
}

#[async_trait]
impl TagSuggester for LocalBackend {
    async fn suggest_tags(&self, _content: &str) -> Result<Vec<String>> {
        Err(Error::Config(
            "tag suggestion requires the remote backend".to_string(),
        ))
    }
}
