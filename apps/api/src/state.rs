use std::sync::Arc;

use crate::config::Config;
use crate::extraction::DocumentExtractor;
use crate::llm_client::LlmClient;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Reachability was probed once at startup and is fixed for the process lifetime.
    pub llm: LlmClient,
    /// Extraction strategy negotiated at startup from the available helper binaries.
    pub extractor: Arc<DocumentExtractor>,
    pub sessions: SessionStore,
}
