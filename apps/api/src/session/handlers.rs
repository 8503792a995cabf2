use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::credentials::{CredentialInputs, CredentialStatus};
use crate::body::ApiJson;
use crate::errors::AppError;
use crate::export::ArtifactKind;
use crate::reader::handlers::DocumentInfo;
use crate::session::{ConversationEntry, Session};
use crate::state::AppState;
use crate::wizard::handlers::WizardSnapshot;

/// Everything a client needs to render a session.
#[derive(Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub credentials: CredentialStatus,
    pub conversation: Vec<ConversationEntry>,
    pub document: Option<DocumentInfo>,
    pub wizard: WizardSnapshot,
    pub artifacts: Vec<ArtifactKind>,
}

impl SessionSnapshot {
    fn of(session: &Session, state: &AppState) -> Self {
        Self {
            id: session.id,
            created_at: session.created_at,
            credentials: session
                .credentials
                .status(&state.config.credential_defaults()),
            conversation: session.conversation.clone(),
            document: session.document.as_ref().map(DocumentInfo::from),
            wizard: WizardSnapshot::of(&session.wizard),
            artifacts: session.available_artifacts(),
        }
    }
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionSnapshot>) {
    let handle = state.sessions.create().await;
    let session = handle.lock().await;
    (StatusCode::CREATED, Json(SessionSnapshot::of(&session, &state)))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let handle = state.sessions.get(id).await?;
    let session = handle.lock().await;
    Ok(Json(SessionSnapshot::of(&session, &state)))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:id/reset
pub async fn handle_reset_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;
    session.reset();
    info!("Session {id} reset");
    Ok(Json(SessionSnapshot::of(&session, &state)))
}

/// PUT /api/v1/sessions/:id/credentials
pub async fn handle_put_credentials(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(inputs): ApiJson<CredentialInputs>,
) -> Result<Json<CredentialStatus>, AppError> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;
    session.credentials = inputs;
    let status = session
        .credentials
        .status(&state.config.credential_defaults());
    info!(
        "Session {id} credentials updated (source: {:?}, model: {})",
        status.source,
        status.model.as_str()
    );
    Ok(Json(status))
}

/// GET /api/v1/sessions/:id/credentials
pub async fn handle_get_credentials(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CredentialStatus>, AppError> {
    let handle = state.sessions.get(id).await?;
    let session = handle.lock().await;
    Ok(Json(
        session
            .credentials
            .status(&state.config.credential_defaults()),
    ))
}
