//! Starter content for a fresh local data directory.
//!
//! Seeding runs once, only when the storage keys are still absent, so a
//! user's own data is never overwritten.

use chrono::{Duration, Utc};
use uuid::Uuid;

use omni_core::metadata::keys;
use omni_core::{generate_id, Catalog, Metadata, MetadataValue, Note, NoteType};

/// The catalogs a fresh installation starts with.
pub fn initial_catalogs() -> Vec<Catalog> {
    vec![
        Catalog {
            id: generate_id(),
            name: "Inbox".to_string(),
            parent_id: None,
        },
        Catalog {
            id: generate_id(),
            name: "Work".to_string(),
            parent_id: None,
        },
        Catalog {
            id: generate_id(),
            name: "Personal".to_string(),
            parent_id: None,
        },
    ]
}

fn catalog_named(catalogs: &[Catalog], name: &str) -> Option<Uuid> {
    catalogs.iter().find(|c| c.name == name).map(|c| c.id)
}

/// A handful of example notes spanning the note types.
pub fn initial_notes(catalogs: &[Catalog]) -> Vec<Note> {
    let now = Utc::now();
    let inbox = catalog_named(catalogs, "Inbox");
    let work = catalog_named(catalogs, "Work");

    let mut welcome = base_note(now, "Welcome to your notes");
    welcome.content = "Everything you capture here stays on this machine until \
you switch the app to the remote API. Use catalogs to group notes and tags to \
cut across them."
        .to_string();
    welcome.tags = vec!["getting-started".to_string()];
    welcome.catalog_id = inbox;

    let mut link = base_note(now - Duration::days(1), "The Rust Book");
    link.note_type = NoteType::Link;
    link.content = "Still the best starting point for the language.".to_string();
    link.metadata.insert(
        keys::URL.to_string(),
        MetadataValue::Text("https://doc.rust-lang.org/book/".to_string()),
    );
    link.tags = vec!["rust".to_string(), "reading".to_string()];
    link.catalog_id = inbox;

    let mut problem = base_note(now - Duration::days(2), "Build cache misses on CI");
    problem.note_type = NoteType::Problem;
    problem.content =
        "Incremental builds restart from scratch on every CI run even though the \
cache step reports a hit."
            .to_string();
    problem.metadata.insert(
        keys::SOLUTION.to_string(),
        MetadataValue::Text(
            "Key the cache on the lockfile hash instead of the branch name.".to_string(),
        ),
    );
    problem
        .metadata
        .insert(keys::STATUS.to_string(), MetadataValue::Text("resolved".to_string()));
    problem.tags = vec!["ci".to_string()];
    problem.catalog_id = work;

    let mut meeting = base_note(now - Duration::days(3), "Sync planning kickoff");
    meeting.note_type = NoteType::Meeting;
    meeting.content = "Agreed to ship the offline-first path before the share \
feature. Follow up on conflict handling next week."
        .to_string();
    meeting.metadata.insert(
        keys::ATTENDEES.to_string(),
        MetadataValue::List(vec!["Alex".to_string(), "Sam".to_string()]),
    );
    meeting.catalog_id = work;

    vec![welcome, link, problem, meeting]
}

fn base_note(at: chrono::DateTime<Utc>, title: &str) -> Note {
    Note {
        id: generate_id(),
        note_type: NoteType::General,
        title: title.to_string(),
        content: String::new(),
        metadata: Metadata::new(),
        tags: Vec::new(),
        catalog_id: None,
        attachments: Vec::new(),
        created_at: at,
        updated_at: at,
        is_archived: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_catalogs_include_inbox() {
        let catalogs = initial_catalogs();
        assert!(catalogs.iter().any(|c| c.name == "Inbox"));
        assert!(catalogs.iter().all(|c| !c.id.is_nil()));
    }

    #[test]
    fn test_seed_notes_reference_seed_catalogs() {
        let catalogs = initial_catalogs();
        let notes = initial_notes(&catalogs);
        assert!(!notes.is_empty());
        for note in &notes {
            if let Some(cid) = note.catalog_id {
                assert!(catalogs.iter().any(|c| c.id == cid));
            }
        }
    }

    #[test]
    fn test_seed_notes_are_active() {
        let catalogs = initial_catalogs();
        assert!(initial_notes(&catalogs).iter().all(|n| !n.is_archived));
    }
}
