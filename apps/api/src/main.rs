mod analysis;
mod chat;
mod config;
mod errors;
mod extraction;
mod formatting;
mod llm_client;
mod report;
mod routes;
mod session;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::extraction::{DocumentExtractor, ExtractionStrategy};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::state::AppState;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails only on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Review API v{}", env!("CARGO_PKG_VERSION"));

    // Negotiate the extraction strategy from the helper binaries on this host
    let strategy = ExtractionStrategy::negotiate(&config.tools);
    info!(
        "Extraction strategy: {} (previews {})",
        strategy.name(),
        if strategy.previews_enabled() { "on" } else { "off" }
    );
    let extractor = Arc::new(DocumentExtractor::new(strategy));

    // Initialize LLM client and probe the endpoint once
    let llm = LlmClient::from_config(&config)?;
    if !llm.has_credential() {
        warn!("GROQ_API_KEY not set - analyses will show manual guidelines only");
    }
    let status = llm.probe().await;
    let llm = llm.with_status(status);
    info!("LLM client initialized (model: {}, status: {:?})", llm.model(), status);

    // Sessions live in memory; idle ones are swept once a minute
    let sessions = SessionStore::new(Duration::from_secs(config.session_ttl_secs));
    sessions.spawn_sweeper(SWEEP_INTERVAL);
    info!("Session TTL: {}s", config.session_ttl_secs);

    // Build app state
    let state = AppState {
        config: config.clone(),
        llm,
        extractor,
        sessions,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
