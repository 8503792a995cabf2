use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::body::ApiJson;
use crate::errors::AppError;
use crate::export::{ArtifactKind, GeneratedArtifact};
use crate::llm_client::SamplingOverride;
use crate::pipeline::generate;
use crate::prompting::{Mode, PromptRequest};
use crate::review::tone::ToneLevel;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub reviewer_comment: String,
    pub raw_thoughts: String,
    #[serde(default)]
    pub tone: ToneLevel,
    #[serde(default)]
    pub sampling: Option<SamplingOverride>,
}

/// POST /api/v1/sessions/:id/review
pub async fn handle_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<ReviewRequest>,
) -> Result<Json<GeneratedArtifact>, AppError> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;

    let request = PromptRequest::new(
        Mode::ReviewerResponse { tone: req.tone },
        req.reviewer_comment,
    )
    .with_auxiliary(req.raw_thoughts);

    let generation = generate(
        state.llm.as_ref(),
        &state.config.credential_defaults(),
        &session.credentials,
        &request,
        req.sampling.as_ref(),
    )
    .await?;

    session.record_artifact(ArtifactKind::ReviewerResponse, &generation.text);
    Ok(Json(GeneratedArtifact {
        generation,
        artifact: ArtifactKind::ReviewerResponse,
    }))
}
