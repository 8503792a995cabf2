pub mod health;
pub mod options;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::export::handlers as export;
use crate::polish::handlers as polish;
use crate::reader::handlers as reader;
use crate::review::handlers as review;
use crate::session::handlers as session;
use crate::state::AppState;
use crate::wizard::handlers as wizard;

/// Upper bound on PDF uploads.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/options", get(options::options_handler))
        // Sessions
        .route("/api/v1/sessions", post(session::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(session::handle_get_session).delete(session::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/reset",
            post(session::handle_reset_session),
        )
        .route(
            "/api/v1/sessions/:id/credentials",
            get(session::handle_get_credentials).put(session::handle_put_credentials),
        )
        // Polisher and reviewer response
        .route("/api/v1/sessions/:id/polish", post(polish::handle_polish))
        .route("/api/v1/sessions/:id/review", post(review::handle_review))
        // PDF reader
        .route(
            "/api/v1/sessions/:id/document",
            post(reader::handle_upload_document).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/api/v1/sessions/:id/document/summary",
            post(reader::handle_summarize_document),
        )
        .route(
            "/api/v1/sessions/:id/chat",
            post(reader::handle_chat).delete(reader::handle_clear_chat),
        )
        // Proposal wizard
        .route("/api/v1/sessions/:id/wizard", get(wizard::handle_get_wizard))
        .route(
            "/api/v1/sessions/:id/wizard/hypotheses",
            post(wizard::handle_generate_hypotheses),
        )
        .route(
            "/api/v1/sessions/:id/wizard/hypotheses/:hid/select",
            post(wizard::handle_select_hypothesis),
        )
        .route(
            "/api/v1/sessions/:id/wizard/methodology",
            post(wizard::handle_generate_methodology),
        )
        .route(
            "/api/v1/sessions/:id/wizard/routes/:route_type/modification",
            put(wizard::handle_modify_route),
        )
        .route(
            "/api/v1/sessions/:id/wizard/routes/:route_type/select",
            post(wizard::handle_select_route),
        )
        .route(
            "/api/v1/sessions/:id/wizard/document",
            post(wizard::handle_generate_final_document),
        )
        .route(
            "/api/v1/sessions/:id/wizard/advance",
            post(wizard::handle_advance),
        )
        .route("/api/v1/sessions/:id/wizard/back", post(wizard::handle_back))
        .route(
            "/api/v1/sessions/:id/wizard/restart",
            post(wizard::handle_restart),
        )
        // Downloads
        .route(
            "/api/v1/sessions/:id/exports/:artifact",
            get(export::handle_export),
        )
        .with_state(state)
}
