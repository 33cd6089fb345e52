//! The in-memory note store.
//!
//! Owns the cached note and catalog lists, the active filter, and the
//! backend aggregate. All cache mutation goes through the store; consumers
//! read snapshots and react to [`StoreEvent`]s.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

use omni_backend::Backend;
use omni_core::{
    defaults, generate_id, Attachment, Catalog, CatalogChanges, FilterPatch, FilterState, NewNote,
    Note, NoteChanges, Result, StoreEvent, StoreEventBus, UploadFile,
};

/// Reactive cache and CRUD orchestrator over a [`Backend`].
pub struct NoteStore {
    backend: Backend,
    notes: RwLock<Vec<Note>>,
    catalogs: RwLock<Vec<Catalog>>,
    filter: RwLock<FilterState>,
    /// Bumped on every cache mutation; cheap change detection for pollers.
    version: AtomicU64,
    events: StoreEventBus,
}

impl NoteStore {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            notes: RwLock::new(Vec::new()),
            catalogs: RwLock::new(Vec::new()),
            filter: RwLock::new(FilterState::default()),
            version: AtomicU64::new(0),
            events: StoreEventBus::new(),
        }
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Subscribe to cache change events.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Snapshot of the cached notes, in display order.
    pub fn notes(&self) -> Vec<Note> {
        self.notes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Snapshot of the cached catalogs.
    pub fn catalogs(&self) -> Vec<Catalog> {
        self.catalogs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The currently active filter.
    pub fn filter(&self) -> FilterState {
        self.filter
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Current cache version.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    fn bump(&self) {
        self.version.fetch_add(1, Ordering::AcqRel);
    }

    // =========================================================================
    // NOTES
    // =========================================================================

    /// Merge a filter patch and re-fetch the note list.
    ///
    /// In-flight fetches for an older filter are not cancelled; the fetch
    /// for the most recently applied filter lands last and wins.
    pub async fn set_filter(&self, patch: FilterPatch) {
        {
            let mut filter = self.filter.write().unwrap_or_else(PoisonError::into_inner);
            filter.apply(patch);
        }
        self.refresh_notes().await;
    }

    /// Re-query the backend with the active filter and rebuild the cache.
    ///
    /// A failed list never leaves the cache stale or the caller with an
    /// error: it degrades to an empty list with a warning.
    pub async fn refresh_notes(&self) {
        let filter = self.filter();
        let notes = match self.backend.notes().list(&filter).await {
            Ok(notes) => notes,
            Err(e) => {
                warn!(error = %e, "note list failed, showing empty");
                Vec::new()
            }
        };

        let count = notes.len();
        *self.notes.write().unwrap_or_else(PoisonError::into_inner) = notes;
        self.bump();
        self.events.emit(StoreEvent::NotesRefreshed { count });
    }

    /// Create a note from a draft.
    ///
    /// Pass `id` to preserve a pre-generated draft id; otherwise one is
    /// assigned here. The canonical stored note is prepended to the cache
    /// without re-checking the filter, so a just-created note is always
    /// visible immediately.
    pub async fn create_note(&self, new: NewNote, id: Option<Uuid>) -> Result<Note> {
        let now = Utc::now();
        let note = Note {
            id: id.unwrap_or_else(generate_id),
            note_type: new.note_type,
            title: new.title,
            content: new.content,
            metadata: new.metadata,
            tags: new.tags,
            catalog_id: new.catalog_id,
            attachments: new.attachments,
            created_at: now,
            updated_at: now,
            is_archived: false,
        };

        let created = self.backend.notes().create(note).await?;
        debug!(id = %created.id, "note created");

        self.notes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(0, created.clone());
        self.bump();
        self.events.emit(StoreEvent::NoteCreated { id: created.id });
        Ok(created)
    }

    /// Partially update a note and reconcile the cache with the result.
    ///
    /// When the update toggles the archived flag out of the active view,
    /// the note is removed from the cache instead of replaced.
    pub async fn update_note(&self, id: Uuid, changes: NoteChanges) -> Result<Note> {
        let archived_change = changes.is_archived;
        let updated = self.backend.notes().update(id, changes).await?;

        let leaves_view = match archived_change {
            Some(flag) => flag != self.filter().is_archived,
            None => false,
        };

        {
            let mut notes = self.notes.write().unwrap_or_else(PoisonError::into_inner);
            if leaves_view {
                notes.retain(|n| n.id != id);
            } else if let Some(slot) = notes.iter_mut().find(|n| n.id == id) {
                *slot = updated.clone();
            }
        }
        self.bump();
        if leaves_view {
            self.events.emit(StoreEvent::NoteRemoved { id });
        } else {
            self.events.emit(StoreEvent::NoteUpdated { id });
        }
        Ok(updated)
    }

    /// Delete a note and drop it from the cache.
    pub async fn delete_note(&self, id: Uuid) -> Result<()> {
        self.backend.notes().delete(id).await?;
        self.notes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|n| n.id != id);
        self.bump();
        self.events.emit(StoreEvent::NoteRemoved { id });
        Ok(())
    }

    /// Cache-only lookup; no backend round trip.
    pub fn get_note(&self, id: Uuid) -> Option<Note> {
        self.notes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|n| n.id == id)
            .cloned()
    }

    /// Guaranteed-fresh single-note read from the backend.
    pub async fn fetch_note(&self, id: Uuid) -> Result<Note> {
        self.backend.notes().get(id).await
    }

    // =========================================================================
    // CATALOGS
    // =========================================================================

    /// Re-fetch catalogs.
    ///
    /// On the remote side an empty account is bootstrapped with a default
    /// catalog so new notes always have somewhere to land; if even that
    /// fails, a placeholder keeps the UI usable.
    pub async fn refresh_catalogs(&self) {
        let catalogs = match self.backend.catalogs().list().await {
            Ok(catalogs) if catalogs.is_empty() && self.backend.is_remote() => {
                self.bootstrap_default_catalog().await
            }
            Ok(catalogs) => catalogs,
            Err(e) => {
                warn!(error = %e, "catalog list failed, showing empty");
                Vec::new()
            }
        };

        let count = catalogs.len();
        *self
            .catalogs
            .write()
            .unwrap_or_else(PoisonError::into_inner) = catalogs;
        self.bump();
        self.events.emit(StoreEvent::CatalogsRefreshed { count });
    }

    async fn bootstrap_default_catalog(&self) -> Vec<Catalog> {
        let inbox = Catalog {
            id: Uuid::nil(),
            name: defaults::DEFAULT_CATALOG_NAME.to_string(),
            parent_id: None,
        };
        match self.backend.catalogs().create(inbox).await {
            Ok(created) => {
                debug!(id = %created.id, "bootstrapped default catalog");
                match self.backend.catalogs().list().await {
                    Ok(catalogs) if !catalogs.is_empty() => catalogs,
                    _ => vec![created],
                }
            }
            Err(e) => {
                warn!(error = %e, "default catalog bootstrap failed, using placeholder");
                vec![Catalog {
                    id: generate_id(),
                    name: defaults::DEFAULT_CATALOG_NAME.to_string(),
                    parent_id: None,
                }]
            }
        }
    }

    /// Refresh both caches.
    pub async fn refresh_all(&self) {
        self.refresh_catalogs().await;
        self.refresh_notes().await;
    }

    /// Create a catalog; the cache keeps backend ordering (append).
    pub async fn create_catalog(&self, name: impl Into<String>, parent_id: Option<Uuid>) -> Result<Catalog> {
        let catalog = Catalog {
            id: Uuid::nil(),
            name: name.into(),
            parent_id,
        };
        let created = self.backend.catalogs().create(catalog).await?;

        self.catalogs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(created.clone());
        self.bump();
        self.events
            .emit(StoreEvent::CatalogCreated { id: created.id });
        Ok(created)
    }

    pub async fn update_catalog(&self, id: Uuid, changes: CatalogChanges) -> Result<Catalog> {
        let updated = self.backend.catalogs().update(id, changes).await?;

        {
            let mut catalogs = self
                .catalogs
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(slot) = catalogs.iter_mut().find(|c| c.id == id) {
                *slot = updated.clone();
            }
        }
        self.bump();
        self.events.emit(StoreEvent::CatalogUpdated { id });
        Ok(updated)
    }

    /// Delete a catalog.
    ///
    /// The backend rejects deleting a catalog that still holds notes; that
    /// error is user-facing and propagates unchanged.
    pub async fn delete_catalog(&self, id: Uuid) -> Result<()> {
        self.backend.catalogs().delete(id).await?;
        self.catalogs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|c| c.id != id);
        self.bump();
        self.events.emit(StoreEvent::CatalogRemoved { id });
        Ok(())
    }

    // =========================================================================
    // PASS-THROUGHS
    // =========================================================================

    /// Upload a file through the active backend.
    pub async fn upload_file(&self, file: UploadFile, note_id: Option<Uuid>) -> Result<Attachment> {
        self.backend.attachments().upload(file, note_id).await
    }

    /// Ask the active backend for tag suggestions.
    pub async fn suggest_tags(&self, content: &str) -> Result<Vec<String>> {
        self.backend.tag_suggester().suggest_tags(content).await
    }
}

impl std::fmt::Debug for NoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteStore")
            .field("backend", &self.backend)
            .field("version", &self.version())
            .finish()
    }
}
