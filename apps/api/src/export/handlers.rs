use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Local;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::export::{ArtifactKind, Export};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub timestamp: bool,
}

/// GET /api/v1/sessions/:id/exports/:artifact
pub async fn handle_export(
    State(state): State<AppState>,
    Path((id, artifact)): Path<(Uuid, String)>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, AppError> {
    let kind = ArtifactKind::from_key(&artifact)
        .ok_or_else(|| AppError::Validation(format!("unknown artifact '{artifact}'")))?;

    let handle = state.sessions.get(id).await?;
    let session = handle.lock().await;

    let content = session
        .artifact(kind)
        .ok_or_else(|| AppError::NotFound(format!("artifact '{artifact}' has not been generated")))?;
    let document_filename = session.document.as_ref().map(|d| d.filename.as_str());

    let export = Export {
        filename: kind.filename(document_filename, query.timestamp, &Local::now()),
        content_type: kind.content_type(),
        content: content.to_string(),
    };

    Ok((
        [
            (header::CONTENT_TYPE, export.content_type.to_string()),
            (header::CONTENT_DISPOSITION, export.content_disposition()),
        ],
        export.content,
    )
        .into_response())
}
