//! Integration tests for the local backend against a real data directory.
//!
//! Timers are paused so the simulated latencies complete instantly.

use chrono::Utc;
use omni_core::{
    generate_id, AttachmentBackend, Catalog, CatalogBackend, CatalogChanges, Error, FilterState,
    Metadata, Note,
    NoteBackend, NoteChanges, NoteType, TagSuggester, UploadFile,
};
use omni_backend::{JsonStore, LocalBackend};

fn new_note(title: &str) -> Note {
    Note {
        id: generate_id(),
        note_type: NoteType::General,
        title: title.into(),
        content: String::new(),
        metadata: Metadata::new(),
        tags: Vec::new(),
        catalog_id: None,
        attachments: Vec::new(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
        is_archived: false,
    }
}

#[tokio::test(start_paused = true)]
async fn test_create_assigns_id_and_prepends() {
    let dir = tempfile::tempdir().unwrap();
    let backend = LocalBackend::open(dir.path()).unwrap();

    let mut first = new_note("first");
    first.id = uuid::Uuid::nil();
    let first = NoteBackend::create(&backend, first).await.unwrap();
    assert!(!first.id.is_nil());

    let second = NoteBackend::create(&backend, new_note("second")).await.unwrap();

    // Insertion order is newest-first even before any update touches dates.
    let store = JsonStore::open(dir.path()).unwrap();
    let raw: Vec<Note> = store.read(omni_core::defaults::NOTES_STORAGE_KEY).unwrap();
    assert_eq!(raw[0].id, second.id);
    assert_eq!(raw[1].id, first.id);
}

#[tokio::test(start_paused = true)]
async fn test_update_refreshes_updated_at_and_reorders_list() {
    let dir = tempfile::tempdir().unwrap();
    let backend = LocalBackend::open(dir.path()).unwrap();

    let old = NoteBackend::create(&backend, new_note("old")).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_secs(1)).await;
    let fresh = NoteBackend::create(&backend, new_note("fresh")).await.unwrap();

    tokio::time::sleep(std::time::Duration::from_secs(1)).await;
    let changes = NoteChanges {
        content: Some("now touched".into()),
        ..Default::default()
    };
    let updated = NoteBackend::update(&backend, old.id, changes).await.unwrap();
    assert!(updated.updated_at > old.updated_at);
    assert_eq!(updated.content, "now touched");

    let listed = NoteBackend::list(&backend, &FilterState::default()).await.unwrap();
    assert_eq!(listed[0].id, old.id);
    assert_eq!(listed[1].id, fresh.id);
}

#[tokio::test(start_paused = true)]
async fn test_get_missing_note_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let backend = LocalBackend::open(dir.path()).unwrap();

    let err = backend.get(generate_id()).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test(start_paused = true)]
async fn test_delete_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let backend = LocalBackend::open(dir.path()).unwrap();

    let note = NoteBackend::create(&backend, new_note("gone")).await.unwrap();
    NoteBackend::delete(&backend, note.id).await.unwrap();
    // A repeat delete of the same id still succeeds.
    NoteBackend::delete(&backend, note.id).await.unwrap();

    let listed = NoteBackend::list(&backend, &FilterState::default()).await.unwrap();
    assert!(listed.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_archived_notes_leave_the_active_view() {
    let dir = tempfile::tempdir().unwrap();
    let backend = LocalBackend::open(dir.path()).unwrap();

    let note = NoteBackend::create(&backend, new_note("shelved")).await.unwrap();
    NoteBackend::update(&backend, note.id, NoteChanges::archive(true))
        .await
        .unwrap();

    let active = NoteBackend::list(&backend, &FilterState::default()).await.unwrap();
    assert!(active.is_empty());

    let archived_view = FilterState {
        is_archived: true,
        ..Default::default()
    };
    let archived = NoteBackend::list(&backend, &archived_view).await.unwrap();
    assert_eq!(archived.len(), 1);
    assert_eq!(archived[0].id, note.id);
}

#[tokio::test(start_paused = true)]
async fn test_catalog_delete_fails_while_notes_remain() {
    let dir = tempfile::tempdir().unwrap();
    let backend = LocalBackend::open(dir.path()).unwrap();

    let catalog = CatalogBackend::create(
        &backend,
        Catalog {
            id: generate_id(),
            name: "Projects".into(),
            parent_id: None,
        },
    )
    .await
    .unwrap();

    let mut note = new_note("inside");
    note.catalog_id = Some(catalog.id);
    let note = NoteBackend::create(&backend, note).await.unwrap();

    let err = CatalogBackend::delete(&backend, catalog.id).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    // Once the note is gone the catalog can go too.
    NoteBackend::delete(&backend, note.id).await.unwrap();
    CatalogBackend::delete(&backend, catalog.id).await.unwrap();
    let catalogs = CatalogBackend::list(&backend).await.unwrap();
    assert!(catalogs.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_catalog_update_can_clear_parent() {
    let dir = tempfile::tempdir().unwrap();
    let backend = LocalBackend::open(dir.path()).unwrap();

    let parent = CatalogBackend::create(
        &backend,
        Catalog {
            id: generate_id(),
            name: "Top".into(),
            parent_id: None,
        },
    )
    .await
    .unwrap();
    let child = CatalogBackend::create(
        &backend,
        Catalog {
            id: generate_id(),
            name: "Nested".into(),
            parent_id: Some(parent.id),
        },
    )
    .await
    .unwrap();

    // A rename alone must not touch the parent.
    let renamed = CatalogBackend::update(
        &backend,
        child.id,
        CatalogChanges {
            name: Some("Renamed".into()),
            parent_id: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(renamed.name, "Renamed");
    assert_eq!(renamed.parent_id, Some(parent.id));

    let updated = CatalogBackend::update(
        &backend,
        child.id,
        CatalogChanges {
            name: None,
            parent_id: Some(None),
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.parent_id, None);
    assert_eq!(updated.name, "Renamed");
}

#[tokio::test(start_paused = true)]
async fn test_upload_encodes_inline_data_url() {
    let dir = tempfile::tempdir().unwrap();
    let backend = LocalBackend::open(dir.path()).unwrap();

    let file = UploadFile {
        name: "hello.txt".into(),
        content_type: "text/plain".into(),
        bytes: b"hello".to_vec(),
    };
    let attachment = backend.upload(file, None).await.unwrap();

    assert_eq!(attachment.name, "hello.txt");
    assert_eq!(attachment.data, "data:text/plain;base64,aGVsbG8=");
}

#[tokio::test(start_paused = true)]
async fn test_tag_suggestion_is_unavailable_locally() {
    let dir = tempfile::tempdir().unwrap();
    let backend = LocalBackend::open(dir.path()).unwrap();

    let err = backend.suggest_tags("anything").await.unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[tokio::test(start_paused = true)]
async fn test_corrupt_notes_key_recovers_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(format!("{}.json", omni_core::defaults::NOTES_STORAGE_KEY)),
        "[{ definitely not json",
    )
    .unwrap();

    let backend = LocalBackend::open(dir.path()).unwrap();
    let listed = NoteBackend::list(&backend, &FilterState::default()).await.unwrap();
    assert!(listed.is_empty());

    // And the store is usable again afterwards.
    NoteBackend::create(&backend, new_note("fresh start")).await.unwrap();
    let listed = NoteBackend::list(&backend, &FilterState::default()).await.unwrap();
    assert_eq!(listed.len(), 1);
}
