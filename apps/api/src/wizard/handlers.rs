use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::body::{ApiJson, OptionalJson};
use crate::errors::AppError;
use crate::llm_client::SamplingOverride;
use crate::pipeline::generate;
use crate::prompting::Prompts;
use crate::state::AppState;
use crate::wizard::machine::WizardState;

/// Wizard state plus the progress figures a client renders.
#[derive(Debug, Serialize)]
pub struct WizardSnapshot {
    #[serde(flatten)]
    pub state: WizardState,
    pub step_number: u8,
    /// 0.0 at Idea, 0.5 at Methodology, 1.0 at Export.
    pub progress: f32,
}

impl WizardSnapshot {
    pub fn of(wizard: &WizardState) -> Self {
        let step_number = wizard.step().number();
        Self {
            state: wizard.clone(),
            step_number,
            progress: f32::from(step_number - 1) / 2.0,
        }
    }
}

/// A generation step's result: the updated wizard and the prompts that were sent.
#[derive(Serialize)]
pub struct WizardGeneration {
    pub wizard: WizardSnapshot,
    pub prompts: Prompts,
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub sampling: Option<SamplingOverride>,
}

#[derive(Debug, Deserialize)]
pub struct HypothesesRequest {
    pub idea: String,
    #[serde(default)]
    pub sampling: Option<SamplingOverride>,
}

#[derive(Debug, Deserialize)]
pub struct ModificationRequest {
    pub modification: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct FinalDocumentRequest {
    /// Route chosen at Export time; the first route when absent.
    #[serde(default)]
    pub route_type: Option<String>,
    #[serde(default)]
    pub sampling: Option<SamplingOverride>,
}

/// GET /api/v1/sessions/:id/wizard
pub async fn handle_get_wizard(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardSnapshot>, AppError> {
    let handle = state.sessions.get(id).await?;
    let session = handle.lock().await;
    Ok(Json(WizardSnapshot::of(&session.wizard)))
}

/// POST /api/v1/sessions/:id/wizard/hypotheses
pub async fn handle_generate_hypotheses(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<HypothesesRequest>,
) -> Result<Json<WizardGeneration>, AppError> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;

    let request = session.wizard.hypotheses_request(&req.idea)?;
    let generation = generate(
        state.llm.as_ref(),
        &state.config.credential_defaults(),
        &session.credentials,
        &request,
        req.sampling.as_ref(),
    )
    .await?;

    let count = session
        .wizard
        .apply_hypotheses_reply(&req.idea, &generation.text)?
        .len();
    info!("Session {id}: {count} hypotheses generated");
    Ok(Json(WizardGeneration {
        wizard: WizardSnapshot::of(&session.wizard),
        prompts: generation.prompts,
    }))
}

/// POST /api/v1/sessions/:id/wizard/hypotheses/:hid/select
pub async fn handle_select_hypothesis(
    State(state): State<AppState>,
    Path((id, hypothesis_id)): Path<(Uuid, u32)>,
) -> Result<Json<WizardSnapshot>, AppError> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;
    session.wizard.select_hypothesis(hypothesis_id)?;
    Ok(Json(WizardSnapshot::of(&session.wizard)))
}

/// POST /api/v1/sessions/:id/wizard/methodology
pub async fn handle_generate_methodology(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    OptionalJson(req): OptionalJson<GenerateRequest>,
) -> Result<Json<WizardGeneration>, AppError> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;

    let request = session.wizard.methodology_request()?;
    let generation = generate(
        state.llm.as_ref(),
        &state.config.credential_defaults(),
        &session.credentials,
        &request,
        req.sampling.as_ref(),
    )
    .await?;

    session.wizard.apply_methodology_reply(&generation.text)?;
    info!("Session {id}: methodology routes generated");
    Ok(Json(WizardGeneration {
        wizard: WizardSnapshot::of(&session.wizard),
        prompts: generation.prompts,
    }))
}

/// PUT /api/v1/sessions/:id/wizard/routes/:route_type/modification
pub async fn handle_modify_route(
    State(state): State<AppState>,
    Path((id, route_type)): Path<(Uuid, String)>,
    ApiJson(req): ApiJson<ModificationRequest>,
) -> Result<Json<WizardSnapshot>, AppError> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;
    session.wizard.modify_route(&route_type, &req.modification)?;
    Ok(Json(WizardSnapshot::of(&session.wizard)))
}

/// POST /api/v1/sessions/:id/wizard/routes/:route_type/select
pub async fn handle_select_route(
    State(state): State<AppState>,
    Path((id, route_type)): Path<(Uuid, String)>,
) -> Result<Json<WizardSnapshot>, AppError> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;
    session.wizard.select_route(&route_type)?;
    Ok(Json(WizardSnapshot::of(&session.wizard)))
}

/// POST /api/v1/sessions/:id/wizard/document
pub async fn handle_generate_final_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    OptionalJson(req): OptionalJson<FinalDocumentRequest>,
) -> Result<Json<WizardGeneration>, AppError> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;

    let (request, route_type) = session
        .wizard
        .final_document_request(req.route_type.as_deref())?;
    let generation = generate(
        state.llm.as_ref(),
        &state.config.credential_defaults(),
        &session.credentials,
        &request,
        req.sampling.as_ref(),
    )
    .await?;

    session
        .wizard
        .apply_final_document(&route_type, generation.text)?;
    info!("Session {id}: proposal generated for route '{route_type}'");
    Ok(Json(WizardGeneration {
        wizard: WizardSnapshot::of(&session.wizard),
        prompts: generation.prompts,
    }))
}

/// POST /api/v1/sessions/:id/wizard/advance
pub async fn handle_advance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardSnapshot>, AppError> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;
    session.wizard.advance()?;
    Ok(Json(WizardSnapshot::of(&session.wizard)))
}

/// POST /api/v1/sessions/:id/wizard/back
pub async fn handle_back(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardSnapshot>, AppError> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;
    session.wizard.back()?;
    Ok(Json(WizardSnapshot::of(&session.wizard)))
}

/// POST /api/v1/sessions/:id/wizard/restart
pub async fn handle_restart(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardSnapshot>, AppError> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;
    session.wizard.restart()?;
    info!("Session {id}: wizard restarted");
    Ok(Json(WizardSnapshot::of(&session.wizard)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::{Method, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};

    use super::*;
    use crate::test_support::*;
    use crate::wizard::models::fixtures::{HYPOTHESES_REPLY, ROUTES_REPLY};

    async fn post(app: &Router, id: &str, path: &str, body: Option<Value>) -> (StatusCode, Value) {
        send(
            app,
            json_request(
                Method::POST,
                &format!("/api/v1/sessions/{id}/wizard/{path}"),
                body,
            ),
        )
        .await
    }

    #[test]
    fn test_snapshot_progress() {
        let snapshot = WizardSnapshot::of(&WizardState::new());
        assert_eq!(snapshot.step_number, 1);
        assert_eq!(snapshot.progress, 0.0);
    }

    #[tokio::test]
    async fn test_full_wizard_flow() {
        let gateway = Arc::new(ScriptedGateway::replying([
            HYPOTHESES_REPLY,
            ROUTES_REPLY,
            "# 开题报告",
        ]));
        let app = test_app(gateway.clone(), StubExtractor::failing());
        let id = create_session(&app).await;

        let (status, body) = post(
            &app,
            &id,
            "hypotheses",
            Some(json!({"idea": "AI for medical diagnosis"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["wizard"]["hypotheses"].as_array().unwrap().len(), 3);
        assert_eq!(body["wizard"]["hypotheses"][0]["hypothesis"], "H1 statement");
        assert_eq!(gateway.calls()[0].sampling.temperature, 0.7);

        let (status, body) = post(&app, &id, "hypotheses/2/select", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["step"], "methodology");
        assert_eq!(body["progress"], 0.5);

        let (status, body) = post(&app, &id, "methodology", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["wizard"]["methodology_routes"][1]["type"], "高精度方案");
        assert!(gateway.calls()[1].user.contains("H2 statement"));

        let (status, _) = send(
            &app,
            json_request(
                Method::PUT,
                &format!("/api/v1/sessions/{id}/wizard/routes/%E4%BD%8E%E6%88%90%E6%9C%AC%E6%96%B9%E6%A1%88/modification"),
                Some(json!({"modification": "add a control group"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = post(&app, &id, "advance", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["step_number"], 3);

        let (status, body) = post(&app, &id, "document", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["wizard"]["final_document"], "# 开题报告");
        assert_eq!(body["wizard"]["selected_route_type"], "低成本方案");
        assert!(gateway.calls()[2]
            .user
            .contains("## 用户微调\nadd a control group"));

        let (status, body) = post(&app, &id, "restart", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["step"], "idea");
        assert!(body["final_document"].is_null());
    }

    async fn get_wizard(app: &Router, id: &str) -> Value {
        let (status, wizard) = send(
            app,
            json_request(Method::GET, &format!("/api/v1/sessions/{id}/wizard"), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        wizard
    }

    #[tokio::test]
    async fn test_parse_failure_returns_raw_and_keeps_step() {
        let gateway = Arc::new(ScriptedGateway::replying([
            HYPOTHESES_REPLY,
            "Sorry, I can't do JSON.",
        ]));
        let app = test_app(gateway, StubExtractor::failing());
        let id = create_session(&app).await;
        post(&app, &id, "hypotheses", Some(json!({"idea": "idea A"}))).await;

        let (status, body) = post(&app, &id, "hypotheses", Some(json!({"idea": "idea B"}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "PARSE_ERROR");
        assert_eq!(body["error"]["raw"], "Sorry, I can't do JSON.");

        let wizard = get_wizard(&app, &id).await;
        assert_eq!(wizard["step"], "idea");
        assert_eq!(wizard["idea"], "idea A");
        assert_eq!(wizard["hypotheses"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_blank_idea_leaves_captured_idea_usable() {
        let gateway = Arc::new(ScriptedGateway::replying([HYPOTHESES_REPLY, ROUTES_REPLY]));
        let app = test_app(gateway.clone(), StubExtractor::failing());
        let id = create_session(&app).await;
        post(&app, &id, "hypotheses", Some(json!({"idea": "idea A"}))).await;

        let (status, body) = post(&app, &id, "hypotheses", Some(json!({"idea": "   "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(get_wizard(&app, &id).await["idea"], "idea A");

        let (status, _) = post(&app, &id, "hypotheses/1/select", None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = post(&app, &id, "methodology", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(gateway.calls().len(), 2);
        assert!(gateway.calls()[1].user.contains("H1 statement"));
    }

    #[tokio::test]
    async fn test_missing_credentials_leave_idea_untouched() {
        let gateway = Arc::new(ScriptedGateway::replying([HYPOTHESES_REPLY]));
        let mut state = test_state(gateway.clone(), StubExtractor::failing());
        state.config.default_api_key = None;
        let app = crate::routes::build_router(state);
        let id = create_session(&app).await;

        let (status, body) = post(&app, &id, "hypotheses", Some(json!({"idea": "idea A"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "CONFIGURATION_ERROR");
        assert_eq!(get_wizard(&app, &id).await["idea"], "");
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_restart_keeps_session_credentials() {
        let gateway = Arc::new(ScriptedGateway::replying([
            HYPOTHESES_REPLY,
            ROUTES_REPLY,
            "# 开题报告",
            HYPOTHESES_REPLY,
        ]));
        let app = test_app(gateway.clone(), StubExtractor::failing());
        let id = create_session(&app).await;

        let (status, _) = send(
            &app,
            json_request(
                Method::PUT,
                &format!("/api/v1/sessions/{id}/credentials"),
                Some(json!({
                    "api_key": "sk-user-key-987654",
                    "base_url": "https://llm.example.org/v1",
                    "model": "deepseek-coder"
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        post(&app, &id, "hypotheses", Some(json!({"idea": "idea"}))).await;
        post(&app, &id, "hypotheses/1/select", None).await;
        post(&app, &id, "methodology", None).await;
        post(&app, &id, "advance", None).await;
        let (status, _) = post(&app, &id, "document", None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = post(&app, &id, "restart", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["step"], "idea");

        let (status, _) = post(&app, &id, "hypotheses", Some(json!({"idea": "second idea"}))).await;
        assert_eq!(status, StatusCode::OK);

        let calls = gateway.calls();
        assert_eq!(calls.len(), 4);
        let last = calls.last().unwrap();
        assert_eq!(last.api_key, "sk-user-key-987654");
        assert_eq!(last.base_url, "https://llm.example.org/v1");
        assert_eq!(last.model, "deepseek-coder");
    }

    #[tokio::test]
    async fn test_out_of_step_operations_are_refused() {
        let gateway = Arc::new(ScriptedGateway::replying(["unused"]));
        let app = test_app(gateway.clone(), StubExtractor::failing());
        let id = create_session(&app).await;

        let (status, body) = post(&app, &id, "advance", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "WIZARD_TRANSITION_REFUSED");

        let (status, _) = post(&app, &id, "methodology", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        let (status, _) = post(&app, &id, "restart", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_generation_keeps_wizard_state() {
        let gateway = Arc::new(ScriptedGateway::replying([HYPOTHESES_REPLY]));
        let app = test_app(gateway, StubExtractor::failing());
        let id = create_session(&app).await;
        post(&app, &id, "hypotheses", Some(json!({"idea": "idea"}))).await;
        post(&app, &id, "hypotheses/1/select", None).await;

        // Script is exhausted, so the gateway reports a failure.
        let (status, _) = post(&app, &id, "methodology", None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);

        let (_, wizard) = send(
            &app,
            json_request(Method::GET, &format!("/api/v1/sessions/{id}/wizard"), None),
        )
        .await;
        assert_eq!(wizard["step"], "methodology");
        assert_eq!(wizard["selected_hypothesis"], 1);
        assert_eq!(wizard["methodology_routes"], json!([]));
    }
}
