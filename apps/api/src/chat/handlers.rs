use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::pipeline::{resolve, OutcomeLabel};
use crate::analysis::prompts::build_chat;
use crate::chat::{recent_turns, ConversationTurn, TurnView, QUICK_QUESTIONS};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
    pub markup: String,
    pub outcome: OutcomeLabel,
    pub notice: Option<String>,
    pub retry_available: bool,
    pub history: Vec<TurnView>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub turns: Vec<TurnView>,
}

/// GET /api/v1/chat/quick-questions
pub async fn handle_quick_questions() -> Json<[&'static str; 5]> {
    Json(QUICK_QUESTIONS)
}

/// GET /api/v1/sessions/:id/chat
pub async fn handle_get_history(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<HistoryResponse>, AppError> {
    let turns = state
        .sessions
        .read(session_id, |session| recent_turns(&session.chat_log))
        .await?;
    Ok(Json(HistoryResponse { turns }))
}

/// POST /api/v1/sessions/:id/chat
///
/// Answers a question about the uploaded résumé. Both the question and the
/// answer (or the fallback guidance) are appended to the chat log.
pub async fn handle_ask(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, AppError> {
    let question = request.question.trim().to_string();

    let (resume_text, job_description) = state
        .sessions
        .read(session_id, |session| {
            (
                session.resume_text().to_string(),
                session.job_description.clone(),
            )
        })
        .await?;

    let mut problems = Vec::new();
    if resume_text.trim().is_empty() {
        problems.push("Please upload a resume first to use the AI assistant");
    }
    if question.is_empty() {
        problems.push("Please enter a question");
    }
    if !problems.is_empty() {
        return Err(AppError::Validation(problems.join("; ")));
    }

    let request = build_chat(&question, &resume_text, &job_description);
    let outcome = state
        .llm
        .analyze(&request, state.config.llm_max_retries)
        .await;
    let answer = resolve(request.kind, outcome);

    let history = state
        .sessions
        .update(session_id, |session| {
            session.chat_log.push(ConversationTurn::user(question));
            session
                .chat_log
                .push(ConversationTurn::assistant(answer.text.clone()));
            recent_turns(&session.chat_log)
        })
        .await?;

    Ok(Json(AskResponse {
        answer: answer.text,
        markup: answer.markup,
        outcome: answer.outcome,
        notice: answer.notice,
        retry_available: answer.retry_available,
        history,
    }))
}

/// DELETE /api/v1/sessions/:id/chat
pub async fn handle_clear_history(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .sessions
        .update(session_id, |session| session.chat_log.clear())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
