//! Core data models for the Omni Notes sync layer.
//!
//! These types are shared across all crates and represent the canonical
//! internal note shape. The persistence backends translate between this shape
//! and their own wire/storage shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::metadata::Metadata;

// =============================================================================
// NOTE TYPES
// =============================================================================

/// Kind of note.
///
/// A small closed set drives the specialized forms, but unknown string values
/// round-trip untouched so newer clients can introduce types without breaking
/// older ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NoteType {
    General,
    Link,
    Problem,
    Lesson,
    Video,
    Meeting,
    /// Forward-compatible unknown type.
    Other(String),
}

impl NoteType {
    /// The stored/wire string for this type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::General => "general",
            Self::Link => "link",
            Self::Problem => "problem",
            Self::Lesson => "lesson",
            Self::Video => "video",
            Self::Meeting => "meeting",
            Self::Other(s) => s,
        }
    }
}

impl Default for NoteType {
    fn default() -> Self {
        Self::General
    }
}

impl std::fmt::Display for NoteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for NoteType {
    fn from(s: &str) -> Self {
        match s {
            "general" => Self::General,
            "link" => Self::Link,
            "problem" => Self::Problem,
            "lesson" => Self::Lesson,
            "video" => Self::Video,
            "meeting" => Self::Meeting,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for NoteType {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<NoteType> for String {
    fn from(t: NoteType) -> Self {
        t.as_str().to_string()
    }
}

// =============================================================================
// ENTITIES
// =============================================================================

/// A file attached to a note.
///
/// Owned exclusively by its parent note. `data` is either an inline data URL
/// (local backend) or a server download URL (remote backend).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: Uuid,
    pub name: String,
    /// MIME type.
    #[serde(rename = "type")]
    pub content_type: String,
    /// Inline-encoded bytes or a resolvable URL, depending on backend.
    pub data: String,
}

/// One user entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Opaque unique id, immutable after creation.
    pub id: Uuid,
    #[serde(rename = "type")]
    pub note_type: NoteType,
    pub title: String,
    /// Primary body (markdown source).
    pub content: String,
    /// Open mapping holding all type-specific fields.
    #[serde(default)]
    pub metadata: Metadata,
    /// Lowercase tags; display order preserved.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Back-reference to the owning catalog; required for persistence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<Uuid>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub created_at: DateTime<Utc>,
    /// Refreshed on every successful update by whichever side is
    /// authoritative (local store or remote server).
    pub updated_at: DateTime<Utc>,
    /// Archived notes are excluded from the default "active" view.
    #[serde(default)]
    pub is_archived: bool,
}

/// A named note container. `parent_id` forms a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
}

// =============================================================================
// FILTER STATE
// =============================================================================

/// Transient query describing the currently visible note subset.
///
/// Not a persisted entity; lives in the note store and drives re-fetch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterState {
    /// Free-text query over title, content, tags, and searchable metadata.
    pub query: String,
    /// None means "all types".
    pub note_type: Option<NoteType>,
    /// None means "all catalogs".
    pub catalog_id: Option<Uuid>,
    pub tag: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    /// The default view shows active (non-archived) notes.
    pub is_archived: bool,
}

/// Partial filter update merged into the active [`FilterState`].
///
/// Outer `None` leaves a field unchanged; for the optional fields the inner
/// `None` clears the criterion back to "all".
#[derive(Debug, Clone, Default)]
pub struct FilterPatch {
    pub query: Option<String>,
    pub note_type: Option<Option<NoteType>>,
    pub catalog_id: Option<Option<Uuid>>,
    pub tag: Option<Option<String>>,
    pub start_date: Option<Option<DateTime<Utc>>>,
    pub end_date: Option<Option<DateTime<Utc>>>,
    pub is_archived: Option<bool>,
}

impl FilterState {
    /// Merge a partial update into this filter.
    pub fn apply(&mut self, patch: FilterPatch) {
        if let Some(query) = patch.query {
            self.query = query;
        }
        if let Some(note_type) = patch.note_type {
            self.note_type = note_type;
        }
        if let Some(catalog_id) = patch.catalog_id {
            self.catalog_id = catalog_id;
        }
        if let Some(tag) = patch.tag {
            self.tag = tag;
        }
        if let Some(start_date) = patch.start_date {
            self.start_date = start_date;
        }
        if let Some(end_date) = patch.end_date {
            self.end_date = end_date;
        }
        if let Some(is_archived) = patch.is_archived {
            self.is_archived = is_archived;
        }
    }
}
