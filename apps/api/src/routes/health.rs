use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service version plus the capabilities negotiated at startup.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let strategy = state.extractor.strategy();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "resume-review",
        "extraction": {
            "strategy": strategy.name(),
            "previews": strategy.previews_enabled(),
        },
        "llm": {
            "model": state.llm.model(),
            "credential": state.llm.has_credential(),
            "status": state.llm.status(),
        },
        "active_sessions": state.sessions.len().await,
    }))
}
