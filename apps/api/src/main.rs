mod body;
mod config;
mod credentials;
mod errors;
mod export;
mod llm_client;
mod pipeline;
mod polish;
mod prompting;
mod reader;
mod review;
mod routes;
mod session;
mod state;
mod wizard;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::reader::extract::PdfPageExtractor;
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Quill API v{}", env!("CARGO_PKG_VERSION"));

    if config.default_api_key.is_none() {
        warn!("DEEPSEEK_API_KEY not set: sessions must supply their own key");
    }
    info!("Default completion endpoint: {}", config.default_base_url);

    let llm = LlmClient::new()?;

    let sessions = SessionStore::new();
    sessions.spawn_eviction(config.session_ttl, config.session_sweep_interval);
    info!(
        "Idle sessions expire after {} minutes",
        config.session_ttl.as_secs() / 60
    );

    let state = AppState {
        config: config.clone(),
        sessions,
        llm: Arc::new(llm),
        extractor: Arc::new(PdfPageExtractor),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
