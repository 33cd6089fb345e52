//! One note's edit session: form state bound to the store.
//!
//! The session fixes the note id up front, so an autosaved draft and the
//! user's eventual manual save address the same note; the first successful
//! save creates, every later one updates.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use omni_core::{generate_id, Error, Note, Result};

use crate::autosave::SaveTarget;
use crate::form::NoteFormState;
use crate::store::NoteStore;

pub struct EditSession {
    store: Arc<NoteStore>,
    form: Mutex<NoteFormState>,
    note_id: Uuid,
    persisted: AtomicBool,
}

impl EditSession {
    /// Start a session for an existing note, or a blank one with
    /// `default_catalog` preselected.
    pub fn new(
        store: Arc<NoteStore>,
        note: Option<&Note>,
        default_catalog: Option<Uuid>,
    ) -> Self {
        let mut form = NoteFormState::new();
        form.initialize(note, default_catalog);
        Self {
            store,
            form: Mutex::new(form),
            note_id: note.map(|n| n.id).unwrap_or_else(generate_id),
            persisted: AtomicBool::new(note.is_some()),
        }
    }

    /// The id every save in this session addresses.
    pub fn note_id(&self) -> Uuid {
        self.note_id
    }

    /// Whether the note exists in the backend yet.
    pub fn is_persisted(&self) -> bool {
        self.persisted.load(Ordering::Acquire)
    }

    /// Read or mutate the form under the session lock.
    pub fn with_form<R>(&self, f: impl FnOnce(&mut NoteFormState) -> R) -> R {
        let mut form = self.form.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut form)
    }

    /// Persist the current form state.
    ///
    /// Creates on the first save, updates afterwards. Rejects invalid forms
    /// with `Validation`.
    ///
    /// The dirty flag is cleared when the request is issued, not when it
    /// resolves: an edit made while the save is in flight re-dirties the
    /// form and is picked up by the next save. A failed save restores the
    /// flag so a retry happens naturally.
    pub async fn save(&self) -> Result<Note> {
        let (valid, draft, changes) = {
            let mut form = self.form.lock().unwrap_or_else(PoisonError::into_inner);
            let snapshot = (form.is_valid(), form.draft(), form.changes());
            if snapshot.0 {
                form.mark_pristine();
            }
            snapshot
        };
        if !valid {
            return Err(Error::Validation(
                "a note needs a title and a catalog".to_string(),
            ));
        }

        let result = if self.is_persisted() {
            self.store.update_note(self.note_id, changes).await
        } else {
            self.store.create_note(draft, Some(self.note_id)).await
        };

        match result {
            Ok(saved) => {
                self.persisted.store(true, Ordering::Release);
                debug!(id = %self.note_id, "session saved");
                Ok(saved)
            }
            Err(e) => {
                // The snapshot never reached the backend; it is still unsaved.
                self.with_form(|form| form.mark_dirty());
                Err(e)
            }
        }
    }
}

#[async_trait]
impl SaveTarget for EditSession {
    fn is_ready(&self) -> bool {
        self.with_form(|form| form.is_valid() && form.is_dirty())
    }

    async fn save(&self) -> Result<()> {
        EditSession::save(self).await.map(|_| ())
    }
}

impl std::fmt::Debug for EditSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSession")
            .field("note_id", &self.note_id)
            .field("persisted", &self.is_persisted())
            .finish()
    }
}
