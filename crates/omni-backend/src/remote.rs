//! Remote REST API backend.
//!
//! Speaks the server's wire dialect, which differs from the internal model
//! in three places: markdown content travels as `contentMd`, metadata
//! travels as a JSON string under `metadataJson`, and timestamps carry a
//! `Utc` suffix. Attachments use `fileName`/`contentType`/`downloadUrl`.
//! Decoding is tolerant: responses may use either dialect per field.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use omni_core::{
    metadata_from_json, metadata_to_json, Attachment, AttachmentBackend, Catalog, CatalogBackend,
    CatalogChanges, Error, FilterState, Metadata, Note, NoteBackend, NoteChanges, NoteType,
    Result, TagSuggester, UploadFile,
};

/// REST client over the notes server.
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    client: Client,
    base_url: String,
}

impl RemoteBackend {
    /// Create a backend against `base_url` (no trailing slash required).
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn notes_url(&self) -> String {
        format!("{}/api/notes", self.base_url)
    }

    fn catalogs_url(&self) -> String {
        format!("{}/api/catalogs", self.base_url)
    }

    fn attachments_url(&self) -> String {
        format!("{}/api/attachments", self.base_url)
    }
}

/// Map a non-success response to a domain error.
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    match status {
        StatusCode::NOT_FOUND => Err(Error::NotFound(body)),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Err(Error::Validation(body)),
        _ => Err(Error::Transport(format!("server returned {status}: {body}"))),
    }
}

// =============================================================================
// WIRE DTOS
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NoteDto {
    id: Uuid,
    #[serde(rename = "type", default)]
    note_type: NoteType,
    #[serde(default)]
    title: String,
    content_md: Option<String>,
    content: Option<String>,
    metadata_json: Option<serde_json::Value>,
    metadata: Option<serde_json::Value>,
    #[serde(default)]
    tags: Vec<String>,
    catalog_id: Option<Uuid>,
    created_at_utc: Option<DateTime<Utc>>,
    created_at: Option<DateTime<Utc>>,
    updated_at_utc: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    is_archived: bool,
    #[serde(default)]
    attachments: Vec<AttachmentDto>,
}

impl NoteDto {
    fn into_note(self) -> Note {
        let metadata = decode_metadata(self.metadata_json, self.metadata);
        Note {
            id: self.id,
            note_type: self.note_type,
            title: self.title,
            content: self.content_md.or(self.content).unwrap_or_default(),
            metadata,
            tags: self.tags,
            catalog_id: self.catalog_id,
            attachments: self
                .attachments
                .into_iter()
                .map(AttachmentDto::into_attachment)
                .collect(),
            created_at: self.created_at_utc.or(self.created_at).unwrap_or_else(Utc::now),
            updated_at: self.updated_at_utc.or(self.updated_at).unwrap_or_else(Utc::now),
            is_archived: self.is_archived,
        }
    }
}

/// Resolve metadata from `metadataJson` (preferred) or a plain object.
///
/// A malformed string degrades to an empty mapping rather than failing the
/// whole note.
fn decode_metadata(
    metadata_json: Option<serde_json::Value>,
    metadata: Option<serde_json::Value>,
) -> Metadata {
    match metadata_json {
        Some(serde_json::Value::String(raw)) if !raw.trim().is_empty() => {
            match serde_json::from_str(&raw) {
                Ok(value) => metadata_from_json(value),
                Err(e) => {
                    warn!(error = %e, "unparsable metadataJson in response, dropping");
                    Metadata::new()
                }
            }
        }
        Some(value @ serde_json::Value::Object(_)) => metadata_from_json(value),
        _ => metadata.map(metadata_from_json).unwrap_or_default(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttachmentDto {
    id: Uuid,
    file_name: Option<String>,
    name: Option<String>,
    content_type: Option<String>,
    #[serde(rename = "type")]
    plain_type: Option<String>,
    download_url: Option<String>,
    data: Option<String>,
}

impl AttachmentDto {
    fn into_attachment(self) -> Attachment {
        Attachment {
            id: self.id,
            name: self.file_name.or(self.name).unwrap_or_default(),
            content_type: self.content_type.or(self.plain_type).unwrap_or_default(),
            data: self.download_url.or(self.data).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AttachmentWireDto {
    id: Uuid,
    file_name: String,
    content_type: String,
    download_url: String,
}

impl From<&Attachment> for AttachmentWireDto {
    fn from(a: &Attachment) -> Self {
        Self {
            id: a.id,
            file_name: a.name.clone(),
            content_type: a.content_type.clone(),
            download_url: a.data.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateNoteDto {
    id: Uuid,
    title: String,
    #[serde(rename = "type")]
    note_type: NoteType,
    content_md: String,
    metadata_json: String,
    tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    catalog_id: Option<Uuid>,
    created_at_utc: DateTime<Utc>,
    updated_at_utc: DateTime<Utc>,
    is_archived: bool,
    attachments: Vec<AttachmentWireDto>,
}

impl CreateNoteDto {
    fn from_note(note: &Note) -> Result<Self> {
        Ok(Self {
            id: note.id,
            title: note.title.clone(),
            note_type: note.note_type.clone(),
            content_md: note.content.clone(),
            metadata_json: serde_json::to_string(&metadata_to_json(&note.metadata))?,
            tags: note.tags.clone(),
            catalog_id: note.catalog_id,
            created_at_utc: note.created_at,
            updated_at_utc: note.updated_at,
            is_archived: note.is_archived,
            attachments: note.attachments.iter().map(AttachmentWireDto::from).collect(),
        })
    }
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateNoteDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    note_type: Option<NoteType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_md: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata_json: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    catalog_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_archived: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_at_utc: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    attachments: Option<Vec<AttachmentWireDto>>,
}

impl UpdateNoteDto {
    fn from_changes(changes: &NoteChanges) -> Result<Self> {
        let metadata_json = match &changes.metadata {
            Some(metadata) => Some(serde_json::to_string(&metadata_to_json(metadata))?),
            None => None,
        };
        Ok(Self {
            title: changes.title.clone(),
            note_type: changes.note_type.clone(),
            content_md: changes.content.clone(),
            metadata_json,
            tags: changes.tags.clone(),
            catalog_id: changes.catalog_id,
            is_archived: changes.is_archived,
            updated_at_utc: changes.updated_at,
            attachments: changes
                .attachments
                .as_ref()
                .map(|atts| atts.iter().map(AttachmentWireDto::from).collect()),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateCatalogDto<'a> {
    name: &'a str,
    parent_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateCatalogDto<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    // Absent field leaves the parent alone, explicit null clears it.
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_id: Option<Option<Uuid>>,
}

#[derive(Debug, Serialize)]
struct SuggestTagsRequest<'a> {
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct SuggestTagsResponse {
    #[serde(default)]
    tags: Vec<String>,
}

fn list_params(filter: &FilterState) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if !filter.query.is_empty() {
        params.push(("q", filter.query.clone()));
    }
    if let Some(note_type) = &filter.note_type {
        params.push(("type", note_type.as_str().to_string()));
    }
    if let Some(catalog_id) = filter.catalog_id {
        params.push(("catalogId", catalog_id.to_string()));
    }
    if let Some(tag) = &filter.tag {
        params.push(("tag", tag.clone()));
    }
    if let Some(start) = filter.start_date {
        params.push(("fromUtc", start.to_rfc3339()));
    }
    if let Some(end) = filter.end_date {
        params.push(("toUtc", end.to_rfc3339()));
    }
    params.push(("archived", filter.is_archived.to_string()));
    params
}

// =============================================================================
// TRAIT IMPLEMENTATIONS
// =============================================================================

#[async_trait]
impl NoteBackend for RemoteBackend {
    async fn list(&self, filter: &FilterState) -> Result<Vec<Note>> {
        let response = self
            .client
            .get(self.notes_url())
            .query(&list_params(filter))
            .send()
            .await?;
        let dtos: Vec<NoteDto> = check(response).await?.json().await?;
        debug!(count = dtos.len(), "remote note list");
        Ok(dtos.into_iter().map(NoteDto::into_note).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Note> {
        let response = self
            .client
            .get(format!("{}/{id}", self.notes_url()))
            .send()
            .await?;
        let dto: NoteDto = check(response).await?.json().await?;
        Ok(dto.into_note())
    }

    async fn create(&self, note: Note) -> Result<Note> {
        let payload = CreateNoteDto::from_note(&note)?;
        let response = self
            .client
            .post(self.notes_url())
            .json(&payload)
            .send()
            .await?;
        let dto: NoteDto = check(response).await?.json().await?;
        Ok(dto.into_note())
    }

    async fn update(&self, id: Uuid, changes: NoteChanges) -> Result<Note> {
        let payload = UpdateNoteDto::from_changes(&changes)?;
        let response = self
            .client
            .put(format!("{}/{id}", self.notes_url()))
            .json(&payload)
            .send()
            .await?;
        let dto: NoteDto = check(response).await?.json().await?;
        Ok(dto.into_note())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let response = self
            .client
            .delete(format!("{}/{id}", self.notes_url()))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl CatalogBackend for RemoteBackend {
    async fn list(&self) -> Result<Vec<Catalog>> {
        let response = self.client.get(self.catalogs_url()).send().await?;
        Ok(check(response).await?.json().await?)
    }

    async fn create(&self, catalog: Catalog) -> Result<Catalog> {
        let body = CreateCatalogDto {
            name: &catalog.name,
            parent_id: catalog.parent_id,
        };
        let response = self
            .client
            .post(self.catalogs_url())
            .json(&body)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn update(&self, id: Uuid, changes: CatalogChanges) -> Result<Catalog> {
        let body = UpdateCatalogDto {
            name: changes.name.as_deref(),
            parent_id: changes.parent_id,
        };
        let response = self
            .client
            .put(format!("{}/{id}", self.catalogs_url()))
            .json(&body)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let response = self
            .client
            .delete(format!("{}/{id}", self.catalogs_url()))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

/// Upload responses arrive either flat or nested under `attachment`.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    attachment: Option<AttachmentDto>,
    #[serde(flatten)]
    flat: serde_json::Value,
}

#[async_trait]
impl AttachmentBackend for RemoteBackend {
    async fn upload(&self, file: UploadFile, note_id: Option<Uuid>) -> Result<Attachment> {
        let part = Part::bytes(file.bytes)
            .file_name(file.name)
            .mime_str(&file.content_type)?;
        let form = Form::new().part("file", part);

        let mut request = self.client.post(self.attachments_url()).multipart(form);
        if let Some(note_id) = note_id {
            request = request.query(&[("noteId", note_id.to_string())]);
        }

        let response = check(request.send().await?).await?;
        let body: UploadResponse = response.json().await?;
        let dto = match body.attachment {
            Some(dto) => dto,
            None => serde_json::from_value(body.flat)?,
        };
        Ok(dto.into_attachment())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let response = self
            .client
            .delete(format!("{}/{id}", self.attachments_url()))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl TagSuggester for RemoteBackend {
    async fn suggest_tags(&self, content: &str) -> Result<Vec<String>> {
        let response = self
            .client
            .post(format!("{}/api/ai/suggest-tags", self.base_url))
            .json(&SuggestTagsRequest { content })
            .send()
            .await?;
        let body: SuggestTagsResponse = check(response).await?.json().await?;
        Ok(body.tags)
    }
}
