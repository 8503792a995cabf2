use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::CompletionGateway;
use crate::reader::extract::PageExtractor;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: SessionStore,
    /// Completion gateway. Production: `LlmClient`.
    pub llm: Arc<dyn CompletionGateway>,
    /// PDF page extractor. Production: `PdfPageExtractor`.
    pub extractor: Arc<dyn PageExtractor>,
}
