use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::body::{ApiJson, OptionalJson};
use crate::errors::AppError;
use crate::export::{ArtifactKind, GeneratedArtifact};
use crate::llm_client::SamplingOverride;
use crate::pipeline::{generate, Generation};
use crate::prompting::{Mode, PromptRequest};
use crate::reader::extract::{extract_document, ExtractedDocument};
use crate::session::{ConversationEntry, Session};
use crate::state::AppState;

/// Client view of the loaded document. The full text stays server-side.
#[derive(Debug, Serialize)]
pub struct DocumentInfo {
    pub filename: String,
    pub page_count: usize,
    pub char_count: usize,
    pub original_chars: usize,
    pub truncated: bool,
    pub has_text: bool,
    pub preview: String,
}

impl From<&ExtractedDocument> for DocumentInfo {
    fn from(doc: &ExtractedDocument) -> Self {
        Self {
            filename: doc.filename.clone(),
            page_count: doc.page_count,
            char_count: doc.char_count(),
            original_chars: doc.original_chars,
            truncated: doc.truncated,
            has_text: doc.has_text,
            preview: doc.preview(),
        }
    }
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub document: DocumentInfo,
    /// False when the same filename was already loaded and nothing changed.
    pub replaced: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct SummaryRequest {
    #[serde(default)]
    pub sampling: Option<SamplingOverride>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub question: String,
    #[serde(default)]
    pub sampling: Option<SamplingOverride>,
}

#[derive(Serialize)]
pub struct ChatResponse {
    #[serde(flatten)]
    pub generation: Generation,
    pub conversation: Vec<ConversationEntry>,
}

/// The document summary and chat work on. Must exist and carry some text.
fn loaded_document(session: &Session) -> Result<&ExtractedDocument, AppError> {
    let document = session
        .document
        .as_ref()
        .ok_or_else(|| AppError::Validation("no document has been uploaded".to_string()))?;
    if !document.has_text {
        return Err(AppError::Validation(format!(
            "'{}' has no extractable text (scanned or empty PDF)",
            document.filename
        )));
    }
    Ok(document)
}

/// POST /api/v1/sessions/:id/document
/// Multipart form with a single `file` field.
pub async fn handle_upload_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| AppError::Validation("uploaded file has no filename".to_string()))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("could not read upload: {e}")))?;
        upload = Some((filename, bytes));
        break;
    }

    let (filename, bytes) =
        upload.ok_or_else(|| AppError::Validation("missing multipart field 'file'".to_string()))?;

    if let Some(current) = session
        .document
        .as_ref()
        .filter(|doc| doc.filename == filename)
    {
        info!("Session {id}: '{filename}' already loaded, skipping extraction");
        return Ok(Json(UploadResponse {
            document: DocumentInfo::from(current),
            replaced: false,
        }));
    }

    if bytes.is_empty() {
        return Err(AppError::Validation("uploaded file is empty".to_string()));
    }

    let document = extract_document(state.extractor.as_ref(), &filename, bytes)
        .await
        .map_err(|e| AppError::Extraction(e.to_string()))?;
    let info = DocumentInfo::from(&document);
    let replaced = session.replace_document(document);

    Ok(Json(UploadResponse {
        document: info,
        replaced,
    }))
}

/// POST /api/v1/sessions/:id/document/summary
pub async fn handle_summarize_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    OptionalJson(req): OptionalJson<SummaryRequest>,
) -> Result<Json<GeneratedArtifact>, AppError> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;

    let request = PromptRequest::new(Mode::DocumentSummary, loaded_document(&session)?.text.clone());
    let generation = generate(
        state.llm.as_ref(),
        &state.config.credential_defaults(),
        &session.credentials,
        &request,
        req.sampling.as_ref(),
    )
    .await?;

    session.record_artifact(ArtifactKind::DocumentSummary, &generation.text);
    Ok(Json(GeneratedArtifact {
        generation,
        artifact: ArtifactKind::DocumentSummary,
    }))
}

/// POST /api/v1/sessions/:id/chat
/// The exchange is only recorded when the completion succeeds.
pub async fn handle_chat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;

    let request = PromptRequest::new(
        Mode::DocumentQuestion,
        loaded_document(&session)?.text.clone(),
    )
    .with_auxiliary(req.question.trim());

    let generation = generate(
        state.llm.as_ref(),
        &state.config.credential_defaults(),
        &session.credentials,
        &request,
        req.sampling.as_ref(),
    )
    .await?;

    session.push_exchange(req.question.trim(), &generation.text);
    Ok(Json(ChatResponse {
        generation,
        conversation: session.conversation.clone(),
    }))
}

/// DELETE /api/v1/sessions/:id/chat
pub async fn handle_clear_chat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let handle = state.sessions.get(id).await?;
    handle.lock().await.conversation.clear();
    Ok(StatusCode::NO_CONTENT)
}
