pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::chat::handlers as chat;
use crate::session::handlers as session;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Sessions
        .route("/api/v1/sessions", post(session::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(session::handle_get_session).delete(session::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/resume",
            post(session::handle_upload_resume),
        )
        .route(
            "/api/v1/sessions/:id/resume/previews/:page",
            get(session::handle_get_preview),
        )
        .route(
            "/api/v1/sessions/:id/job-description",
            put(session::handle_set_job_description),
        )
        // Analysis
        .route("/api/v1/analysis/kinds", get(analysis::handle_list_kinds))
        .route(
            "/api/v1/sessions/:id/analysis",
            post(analysis::handle_run_analysis),
        )
        .route(
            "/api/v1/sessions/:id/analysis/:kind/report",
            get(analysis::handle_download_report),
        )
        // Chat
        .route(
            "/api/v1/chat/quick-questions",
            get(chat::handle_quick_questions),
        )
        .route(
            "/api/v1/sessions/:id/chat",
            get(chat::handle_get_history)
                .post(chat::handle_ask)
                .delete(chat::handle_clear_history),
        )
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
