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
use crate::polish::options::{PolishStyle, TextType};
use crate::prompting::{Mode, PromptRequest};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolishMode {
    #[default]
    Standard,
    Humanize,
    StyleMimic,
}

#[derive(Debug, Deserialize)]
pub struct PolishRequest {
    pub draft_text: String,
    #[serde(default)]
    pub mode: PolishMode,
    /// Standard mode only.
    #[serde(default)]
    pub text_type: TextType,
    /// Standard mode only.
    #[serde(default)]
    pub style: PolishStyle,
    /// Style mimic only.
    #[serde(default)]
    pub reference_text: Option<String>,
    #[serde(default)]
    pub sampling: Option<SamplingOverride>,
}

impl PolishRequest {
    fn into_prompt_request(self) -> (PromptRequest, ArtifactKind) {
        let (mode, artifact) = match self.mode {
            PolishMode::Standard => (
                Mode::StandardPolish {
                    text_type: self.text_type,
                    style: self.style,
                },
                ArtifactKind::Polished,
            ),
            PolishMode::Humanize => (Mode::Humanize, ArtifactKind::Humanized),
            PolishMode::StyleMimic => (Mode::StyleMimic, ArtifactKind::StyleMimic),
        };
        let mut request = PromptRequest::new(mode, self.draft_text);
        if let Some(reference) = self.reference_text {
            request = request.with_auxiliary(reference);
        }
        (request, artifact)
    }
}

/// POST /api/v1/sessions/:id/polish
pub async fn handle_polish(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<PolishRequest>,
) -> Result<Json<GeneratedArtifact>, AppError> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;

    let sampling = req.sampling;
    let (request, artifact) = req.into_prompt_request();
    let generation = generate(
        state.llm.as_ref(),
        &state.config.credential_defaults(),
        &session.credentials,
        &request,
        sampling.as_ref(),
    )
    .await?;

    session.record_artifact(artifact, &generation.text);
    Ok(Json(GeneratedArtifact {
        generation,
        artifact,
    }))
}
