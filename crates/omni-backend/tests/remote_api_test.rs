//! Integration tests for the remote backend's wire behavior.
//!
//! Each test stands up a mock server, mounts the expected route, and checks
//! both the request shape the client sends and the translation applied to
//! the response.

use omni_core::metadata::keys;
use omni_core::{
    AttachmentBackend, CatalogBackend, CatalogChanges, Error, FilterState, Metadata, MetadataValue,
    Note, NoteBackend, NoteChanges, NoteType, TagSuggester, UploadFile,
};
use omni_backend::RemoteBackend;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const NOTE_ID: &str = "6f2b9a34-7c1d-4e5f-8a90-112233445566";

fn server_note(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "type": "problem",
        "title": "Flaky integration suite",
        "contentMd": "## symptoms",
        "metadataJson": "{\"solution\":\"serialize the port allocation\",\"status\":\"resolved\"}",
        "tags": ["ci", "flaky"],
        "createdAtUtc": "2026-02-01T10:00:00Z",
        "updatedAtUtc": "2026-02-02T11:00:00Z",
        "isArchived": false,
        "attachments": [{
            "id": "0e8400b1-22aa-4f6c-9c71-aabbccddeeff",
            "fileName": "run.log",
            "contentType": "text/plain",
            "downloadUrl": "/api/attachments/0e8400b1/download"
        }]
    })
}

#[tokio::test]
async fn test_list_sends_filter_params_and_translates_fields() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/notes"))
        .and(query_param("q", "flaky"))
        .and(query_param("tag", "ci"))
        .and(query_param("archived", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([server_note(NOTE_ID)])))
        .expect(1)
        .mount(&server)
        .await;

    let backend = RemoteBackend::new(server.uri()).unwrap();
    let filter = FilterState {
        query: "flaky".into(),
        tag: Some("ci".into()),
        ..Default::default()
    };
    let notes = NoteBackend::list(&backend, &filter).await.unwrap();

    assert_eq!(notes.len(), 1);
    let note = &notes[0];
    assert_eq!(note.note_type, NoteType::Problem);
    assert_eq!(note.content, "## symptoms");
    assert_eq!(
        note.metadata.get(keys::SOLUTION),
        Some(&MetadataValue::Text("serialize the port allocation".into()))
    );
    assert_eq!(note.attachments[0].name, "run.log");
    assert_eq!(note.attachments[0].data, "/api/attachments/0e8400b1/download");
}

#[tokio::test]
async fn test_create_sends_wire_dialect() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/notes"))
        .and(body_partial_json(json!({
            "contentMd": "body text",
            "metadataJson": "{\"url\":\"https://example.com\"}",
            "isArchived": false
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(server_note(NOTE_ID)))
        .expect(1)
        .mount(&server)
        .await;

    let mut metadata = Metadata::new();
    metadata.insert(
        keys::URL.to_string(),
        MetadataValue::Text("https://example.com".into()),
    );
    let note = Note {
        id: NOTE_ID.parse().unwrap(),
        note_type: NoteType::Link,
        title: "t".into(),
        content: "body text".into(),
        metadata,
        tags: vec![],
        catalog_id: None,
        attachments: vec![],
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
        is_archived: false,
    };

    let backend = RemoteBackend::new(server.uri()).unwrap();
    let created = NoteBackend::create(&backend, note).await.unwrap();
    assert_eq!(created.id.to_string(), NOTE_ID);
}

#[tokio::test]
async fn test_update_sends_only_changed_fields() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(format!("/api/notes/{NOTE_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(server_note(NOTE_ID)))
        .expect(1)
        .mount(&server)
        .await;

    let backend = RemoteBackend::new(server.uri()).unwrap();
    let changes = NoteChanges {
        content: Some("edited".into()),
        ..Default::default()
    };
    NoteBackend::update(&backend, NOTE_ID.parse().unwrap(), changes)
        .await
        .unwrap();

    let requests: Vec<Request> = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["contentMd"], "edited");
    assert!(body.get("title").is_none());
    assert!(body.get("content").is_none());
}

#[tokio::test]
async fn test_missing_note_maps_to_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such note"))
        .mount(&server)
        .await;

    let backend = RemoteBackend::new(server.uri()).unwrap();
    let err = backend.get(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_rejected_update_maps_to_validation() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(422).set_body_string("title required"))
        .mount(&server)
        .await;

    let backend = RemoteBackend::new(server.uri()).unwrap();
    let err = NoteBackend::update(&backend, Uuid::new_v4(), NoteChanges::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(msg) if msg.contains("title required")));
}

#[tokio::test]
async fn test_malformed_metadata_json_yields_empty_mapping() {
    let server = MockServer::start().await;

    let mut note = server_note(NOTE_ID);
    note["metadataJson"] = json!("{broken");
    Mock::given(method("GET"))
        .and(path(format!("/api/notes/{NOTE_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(note))
        .mount(&server)
        .await;

    let backend = RemoteBackend::new(server.uri()).unwrap();
    let note = backend.get(NOTE_ID.parse().unwrap()).await.unwrap();
    assert!(note.metadata.is_empty());
}

#[tokio::test]
async fn test_catalog_create_sends_explicit_null_parent() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/catalogs"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "7b1e0c22-3344-4a55-9b66-778899aabbcc",
            "name": "Reading",
            "parentId": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = RemoteBackend::new(server.uri()).unwrap();
    let catalog = omni_core::Catalog {
        id: Uuid::nil(),
        name: "Reading".into(),
        parent_id: None,
    };
    let created = CatalogBackend::create(&backend, catalog).await.unwrap();
    assert_eq!(created.name, "Reading");

    let requests: Vec<Request> = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["name"], "Reading");
    assert_eq!(body["parentId"], serde_json::Value::Null);
    // The body is the lean create shape, not a full catalog.
    assert!(body.get("id").is_none());
}

#[tokio::test]
async fn test_catalog_rename_omits_parent_from_body() {
    let server = MockServer::start().await;
    let catalog_id: Uuid = "7b1e0c22-3344-4a55-9b66-778899aabbcc".parse().unwrap();

    Mock::given(method("PUT"))
        .and(path(format!("/api/catalogs/{catalog_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": catalog_id,
            "name": "Archive",
            "parentId": "11112222-3344-4a55-9b66-778899aabbcc"
        })))
        .expect(2)
        .mount(&server)
        .await;

    let backend = RemoteBackend::new(server.uri()).unwrap();
    CatalogBackend::update(
        &backend,
        catalog_id,
        CatalogChanges {
            name: Some("Archive".into()),
            parent_id: None,
        },
    )
    .await
    .unwrap();
    CatalogBackend::update(
        &backend,
        catalog_id,
        CatalogChanges {
            name: None,
            parent_id: Some(None),
        },
    )
    .await
    .unwrap();

    let requests: Vec<Request> = server.received_requests().await.unwrap();
    let rename: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(rename["name"], "Archive");
    // A rename must not carry a parent assignment at all.
    assert!(rename.get("parentId").is_none());

    let detach: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
    assert!(detach.get("name").is_none());
    assert_eq!(detach["parentId"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_upload_binds_note_and_unwraps_nested_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/attachments"))
        .and(query_param("noteId", NOTE_ID))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "attachment": {
                "id": "0e8400b1-22aa-4f6c-9c71-aabbccddeeff",
                "fileName": "diagram.png",
                "contentType": "image/png",
                "downloadUrl": "/api/attachments/0e8400b1/download"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = RemoteBackend::new(server.uri()).unwrap();
    let file = UploadFile {
        name: "diagram.png".into(),
        content_type: "image/png".into(),
        bytes: vec![0x89, 0x50, 0x4e, 0x47],
    };
    let attachment = backend.upload(file, Some(NOTE_ID.parse().unwrap())).await.unwrap();

    assert_eq!(attachment.name, "diagram.png");
    assert_eq!(attachment.content_type, "image/png");
    assert_eq!(attachment.data, "/api/attachments/0e8400b1/download");
}

#[tokio::test]
async fn test_suggest_tags_posts_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/ai/suggest-tags"))
        .and(body_partial_json(json!({"content": "rust async runtimes"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"tags": ["rust", "async"]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let backend = RemoteBackend::new(server.uri()).unwrap();
    let tags = backend.suggest_tags("rust async runtimes").await.unwrap();
    assert_eq!(tags, vec!["rust".to_string(), "async".to_string()]);
}
