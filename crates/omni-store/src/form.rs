//! Structured form state for one note being created or edited.
//!
//! The form holds the typed fields the editor surfaces directly; `draft()`
//! and `changes()` fold them back into the open metadata mapping the rest
//! of the system carries.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use omni_core::metadata::keys;
use omni_core::{
    defaults, Attachment, Metadata, MetadataValue, NewNote, Note, NoteChanges, NoteType,
};

/// Structural sub-type of a general note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubType {
    #[default]
    Idea,
    Checklist,
}

impl SubType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubType::Idea => "idea",
            SubType::Checklist => "checklist",
        }
    }
}

impl From<&str> for SubType {
    fn from(s: &str) -> Self {
        match s {
            "checklist" => SubType::Checklist,
            _ => SubType::Idea,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

/// Mutable state of a note editor session.
#[derive(Debug, Clone)]
pub struct NoteFormState {
    pub title: String,
    pub content: String,
    pub note_type: NoteType,
    pub catalog_id: Option<Uuid>,

    // Typed views over the metadata mapping.
    pub url: String,
    pub solution: String,
    pub source: String,
    pub severity: String,
    pub status: String,
    pub environment: String,
    pub meeting_date: Option<DateTime<Utc>>,
    pub sub_type: SubType,
    pub priority: Option<Priority>,
    pub confidence: Option<f64>,
    pub theme_color: String,
    pub attendees: Vec<String>,

    pub tags: Vec<String>,
    pub attachments: Vec<Attachment>,

    dirty: bool,
}

impl Default for NoteFormState {
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            note_type: NoteType::General,
            catalog_id: None,
            url: String::new(),
            solution: String::new(),
            source: String::new(),
            severity: "low".to_string(),
            status: "open".to_string(),
            environment: String::new(),
            meeting_date: None,
            sub_type: SubType::Idea,
            priority: None,
            confidence: None,
            theme_color: defaults::DEFAULT_THEME_COLOR.to_string(),
            attendees: Vec::new(),
            tags: Vec::new(),
            attachments: Vec::new(),
            dirty: false,
        }
    }
}

impl NoteFormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate from an existing note, or reset for a new one with a
    /// default catalog preselected. Either way the form starts pristine.
    pub fn initialize(&mut self, note: Option<&Note>, default_catalog: Option<Uuid>) {
        match note {
            Some(note) => self.populate(note),
            None => self.reset(default_catalog),
        }
    }

    /// Reset to a blank form with `default_catalog` preselected.
    pub fn reset(&mut self, default_catalog: Option<Uuid>) {
        *self = Self::default();
        self.catalog_id = default_catalog;
    }

    fn populate(&mut self, note: &Note) {
        let text = |key: &str| {
            omni_core::text_value(&note.metadata, key)
                .map(str::to_string)
                .unwrap_or_default()
        };

        *self = Self {
            title: note.title.clone(),
            content: note.content.clone(),
            note_type: note.note_type.clone(),
            catalog_id: note.catalog_id,
            url: text(keys::URL),
            solution: text(keys::SOLUTION),
            source: text(keys::SOURCE),
            severity: omni_core::text_value(&note.metadata, keys::SEVERITY)
                .unwrap_or("low")
                .to_string(),
            status: omni_core::text_value(&note.metadata, keys::STATUS)
                .unwrap_or("open")
                .to_string(),
            environment: text(keys::ENVIRONMENT),
            meeting_date: omni_core::text_value(&note.metadata, keys::MEETING_DATE)
                .and_then(|s| s.parse().ok()),
            sub_type: omni_core::text_value(&note.metadata, keys::SUB_TYPE)
                .map(SubType::from)
                .unwrap_or_default(),
            priority: omni_core::text_value(&note.metadata, keys::PRIORITY)
                .and_then(Priority::parse),
            confidence: omni_core::number_value(&note.metadata, keys::CONFIDENCE),
            theme_color: omni_core::text_value(&note.metadata, keys::THEME_COLOR)
                .unwrap_or(defaults::DEFAULT_THEME_COLOR)
                .to_string(),
            attendees: omni_core::list_value(&note.metadata, keys::ATTENDEES)
                .map(<[String]>::to_vec)
                .unwrap_or_default(),
            tags: note.tags.clone(),
            attachments: note.attachments.clone(),
            dirty: false,
        };
    }

    // =========================================================================
    // MUTATION
    // =========================================================================

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.dirty = true;
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.dirty = true;
    }

    pub fn set_note_type(&mut self, note_type: NoteType) {
        self.note_type = note_type;
        self.dirty = true;
    }

    pub fn set_catalog(&mut self, catalog_id: Option<Uuid>) {
        self.catalog_id = catalog_id;
        self.dirty = true;
    }

    pub fn set_sub_type(&mut self, sub_type: SubType) {
        self.sub_type = sub_type;
        self.dirty = true;
    }

    pub fn set_priority(&mut self, priority: Option<Priority>) {
        self.priority = priority;
        self.dirty = true;
    }

    pub fn set_confidence(&mut self, confidence: Option<f64>) {
        self.confidence = confidence;
        self.dirty = true;
    }

    /// Set one of the free-text metadata fields by key.
    pub fn set_text_field(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match key {
            keys::URL => self.url = value,
            keys::SOLUTION => self.solution = value,
            keys::SOURCE => self.source = value,
            keys::SEVERITY => self.severity = value,
            keys::STATUS => self.status = value,
            keys::ENVIRONMENT => self.environment = value,
            keys::THEME_COLOR => self.theme_color = value,
            _ => return,
        }
        self.dirty = true;
    }

    /// Add a tag; tags are lowercased and deduplicated.
    pub fn add_tag(&mut self, tag: &str) {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !self.tags.contains(&tag) {
            self.tags.push(tag);
            self.dirty = true;
        }
    }

    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|t| t != tag);
        self.dirty = true;
    }

    pub fn add_attachment(&mut self, attachment: Attachment) {
        self.attachments.push(attachment);
        self.dirty = true;
    }

    pub fn remove_attachment(&mut self, id: Uuid) {
        self.attachments.retain(|a| a.id != id);
        self.dirty = true;
    }

    pub fn add_attendee(&mut self, person: &str) {
        let person = person.trim();
        if !person.is_empty() && !self.attendees.iter().any(|p| p == person) {
            self.attendees.push(person.to_string());
            self.dirty = true;
        }
    }

    pub fn remove_attendee(&mut self, person: &str) {
        self.attendees.retain(|p| p != person);
        self.dirty = true;
    }

    // =========================================================================
    // COMPUTED STATE
    // =========================================================================

    /// A note is saveable once it has a title and a catalog.
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty() && self.catalog_id.is_some()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn mark_pristine(&mut self) {
        self.dirty = false;
    }

    /// No content to show yet.
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Percentage of checked items among `- [ ]` / `- [x]` lines.
    ///
    /// Zero unless the form is in checklist mode or there are no items.
    pub fn checklist_progress(&self) -> u8 {
        if self.sub_type != SubType::Checklist {
            return 0;
        }
        let items: Vec<&str> = self
            .content
            .lines()
            .map(str::trim)
            .filter(|l| l.starts_with("- ["))
            .collect();
        if items.is_empty() {
            return 0;
        }
        let done = items.iter().filter(|l| l.starts_with("- [x]")).count();
        ((done as f64 / items.len() as f64) * 100.0).round() as u8
    }

    // =========================================================================
    // ASSEMBLY
    // =========================================================================

    fn assemble_metadata(&self) -> Metadata {
        let mut metadata = Metadata::new();
        let mut text = |key: &str, value: &str| {
            if !value.is_empty() {
                metadata.insert(key.to_string(), MetadataValue::Text(value.to_string()));
            }
        };
        text(keys::URL, &self.url);
        text(keys::SOLUTION, &self.solution);
        text(keys::SOURCE, &self.source);
        text(keys::SEVERITY, &self.severity);
        text(keys::STATUS, &self.status);
        text(keys::ENVIRONMENT, &self.environment);
        text(keys::THEME_COLOR, &self.theme_color);
        text(keys::SUB_TYPE, self.sub_type.as_str());

        if let Some(meeting_date) = self.meeting_date {
            metadata.insert(
                keys::MEETING_DATE.to_string(),
                MetadataValue::Text(meeting_date.to_rfc3339()),
            );
        }
        if let Some(priority) = self.priority {
            metadata.insert(
                keys::PRIORITY.to_string(),
                MetadataValue::Text(priority.as_str().to_string()),
            );
        }
        if let Some(confidence) = self.confidence {
            metadata.insert(keys::CONFIDENCE.to_string(), MetadataValue::Number(confidence));
        }
        if !self.attendees.is_empty() {
            metadata.insert(
                keys::ATTENDEES.to_string(),
                MetadataValue::List(self.attendees.clone()),
            );
        }
        metadata
    }

    /// Assemble a create draft from the current state.
    pub fn draft(&self) -> NewNote {
        NewNote {
            note_type: self.note_type.clone(),
            title: self.title.clone(),
            content: self.content.clone(),
            metadata: self.assemble_metadata(),
            tags: self.tags.clone(),
            catalog_id: self.catalog_id,
            attachments: self.attachments.clone(),
        }
    }

    /// Assemble a full-form partial update from the current state.
    pub fn changes(&self) -> NoteChanges {
        NoteChanges {
            title: Some(self.title.clone()),
            content: Some(self.content.clone()),
            note_type: Some(self.note_type.clone()),
            metadata: Some(self.assemble_metadata()),
            tags: Some(self.tags.clone()),
            catalog_id: self.catalog_id,
            attachments: Some(self.attachments.clone()),
            is_archived: None,
            updated_at: Some(Utc::now()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use omni_core::generate_id;

    #[test]
    fn test_fresh_form_is_pristine_and_invalid() {
        let form = NoteFormState::new();
        assert!(!form.is_dirty());
        assert!(!form.is_valid());
        assert!(form.is_empty());
    }

    #[test]
    fn test_validity_needs_title_and_catalog() {
        let mut form = NoteFormState::new();
        form.set_title("Groceries");
        assert!(!form.is_valid());

        form.set_catalog(Some(generate_id()));
        assert!(form.is_valid());

        form.set_title("   ");
        assert!(!form.is_valid());
    }

    #[test]
    fn test_edits_mark_dirty_and_initialize_resets() {
        let mut form = NoteFormState::new();
        form.set_content("draft text");
        assert!(form.is_dirty());

        form.initialize(None, Some(generate_id()));
        assert!(!form.is_dirty());
        assert!(form.catalog_id.is_some());
        assert!(form.content.is_empty());
    }

    #[test]
    fn test_tags_are_lowercased_and_deduped() {
        let mut form = NoteFormState::new();
        form.add_tag("Rust");
        form.add_tag("rust");
        form.add_tag("  ");
        assert_eq!(form.tags, vec!["rust".to_string()]);
    }

    #[test]
    fn test_checklist_progress_counts_checked_lines() {
        let mut form = NoteFormState::new();
        form.set_content("- [x] flour\n- [ ] yeast\n- [x] salt\nnot an item");

        // Idea mode reports no progress.
        assert_eq!(form.checklist_progress(), 0);

        form.set_sub_type(SubType::Checklist);
        assert_eq!(form.checklist_progress(), 67);
    }

    #[test]
    fn test_draft_folds_typed_fields_into_metadata() {
        let mut form = NoteFormState::new();
        form.set_title("Broken deploy");
        form.set_note_type(NoteType::Problem);
        form.set_catalog(Some(generate_id()));
        form.set_text_field(keys::SOLUTION, "roll back the config");
        form.set_priority(Some(Priority::High));
        form.add_attendee("Sam");

        let draft = form.draft();
        assert_eq!(
            draft.metadata.get(keys::SOLUTION),
            Some(&MetadataValue::Text("roll back the config".into()))
        );
        assert_eq!(
            draft.metadata.get(keys::PRIORITY),
            Some(&MetadataValue::Text("high".into()))
        );
        assert_eq!(
            draft.metadata.get(keys::ATTENDEES),
            Some(&MetadataValue::List(vec!["Sam".into()]))
        );
        // Defaults still travel.
        assert_eq!(
            draft.metadata.get(keys::SEVERITY),
            Some(&MetadataValue::Text("low".into()))
        );
        // Empty fields do not.
        assert!(draft.metadata.get(keys::URL).is_none());
    }

    #[test]
    fn test_populate_round_trips_metadata() {
        let mut form = NoteFormState::new();
        form.set_title("Standup");
        form.set_note_type(NoteType::Meeting);
        form.set_catalog(Some(generate_id()));
        form.add_attendee("Alex");
        form.set_confidence(Some(0.8));

        let draft = form.draft();
        let note = Note {
            id: generate_id(),
            note_type: draft.note_type.clone(),
            title: draft.title.clone(),
            content: draft.content.clone(),
            metadata: draft.metadata.clone(),
            tags: draft.tags.clone(),
            catalog_id: draft.catalog_id,
            attachments: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            is_archived: false,
        };

        let mut reloaded = NoteFormState::new();
        reloaded.initialize(Some(&note), None);
        assert_eq!(reloaded.attendees, vec!["Alex".to_string()]);
        assert_eq!(reloaded.confidence, Some(0.8));
        assert_eq!(reloaded.note_type, NoteType::Meeting);
        assert!(!reloaded.is_dirty());
    }
}
