//! Axum route handlers for sessions, résumé upload and the job description.

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::AnalysisKind;
use crate::errors::AppError;
use crate::extraction::{ExtractedDocument, ExtractionStatus, MAX_PREVIEW_PAGES};
use crate::llm_client::BackendStatus;
use crate::session::Session;
use crate::state::AppState;

const UPLOAD_FIELD: &str = "file";
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ResumeSummary {
    pub word_count: usize,
    pub char_count: usize,
    pub preview_pages: Vec<u32>,
}

impl From<&ExtractedDocument> for ResumeSummary {
    fn from(doc: &ExtractedDocument) -> Self {
        Self {
            word_count: doc.word_count(),
            char_count: doc.char_count(),
            preview_pages: doc.preview_images.iter().map(|p| p.page).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub resume: Option<ResumeSummary>,
    pub job_description_words: usize,
    pub completed_analyses: Vec<AnalysisKind>,
    pub chat_turns: usize,
    pub api_status: BackendStatus,
    pub extraction_strategy: &'static str,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub extraction: ExtractionStatus,
    pub resume: ResumeSummary,
    /// Full extracted text, for the "view extracted text" panel.
    pub text: String,
    pub message: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct JobDescriptionRequest {
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct JobDescriptionResponse {
    pub word_count: usize,
}

fn session_view(state: &AppState, session: &Session) -> SessionView {
    let completed_analyses = AnalysisKind::ALL
        .into_iter()
        .filter(|kind| session.results.contains_key(kind))
        .collect();

    SessionView {
        session_id: session.id,
        created_at: session.created_at,
        resume: session.document.as_ref().map(ResumeSummary::from),
        job_description_words: session.job_description_words(),
        completed_analyses,
        chat_turns: session.chat_log.len(),
        api_status: state.llm.status(),
        extraction_strategy: state.extractor.strategy().name(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionView>) {
    let session = state.sessions.create().await;
    (StatusCode::CREATED, Json(session_view(&state, &session)))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let view = state
        .sessions
        .read(session_id, |session| session_view(&state, session))
        .await?;
    Ok(Json(view))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:id/resume
///
/// Multipart upload of a résumé PDF (field `file`). The extracted document
/// replaces the previous one even when extraction produced nothing.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    // Fail fast on unknown sessions before doing any extraction work.
    state.sessions.read(session_id, |_| ()).await?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid upload: {e}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) && field.file_name().is_none() {
            continue;
        }
        let content_type = field
            .content_type()
            .unwrap_or(FALLBACK_CONTENT_TYPE)
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Invalid upload: {e}")))?;
        upload = Some((content_type, data));
        break;
    }

    let (content_type, data) = upload
        .ok_or_else(|| AppError::Validation("Please choose a PDF file to upload".to_string()))?;

    let report = state.extractor.extract(data, &content_type).await;
    let summary = ResumeSummary::from(&report.document);
    let text = report.document.text.clone();

    state
        .sessions
        .update(session_id, |session| session.replace_document(report.document))
        .await?;

    let message = match &report.status {
        ExtractionStatus::Rejected => {
            return Err(AppError::UnsupportedMediaType(
                "Please upload a PDF file".to_string(),
            ))
        }
        ExtractionStatus::Failed(detail) => return Err(AppError::Extraction(detail.clone())),
        _ if text.trim().is_empty() => {
            "Could not extract text from the PDF. Please ensure the file contains readable text."
        }
        _ => "Resume uploaded and processed successfully!",
    };

    Ok(Json(UploadResponse {
        extraction: report.status,
        resume: summary,
        text,
        message,
    }))
}

/// GET /api/v1/sessions/:id/resume/previews/:page
pub async fn handle_get_preview(
    State(state): State<AppState>,
    Path((session_id, page)): Path<(Uuid, u32)>,
) -> Result<Response, AppError> {
    if page == 0 || page as usize > MAX_PREVIEW_PAGES {
        return Err(AppError::NotFound(format!("Preview page {page} not found")));
    }

    let png = state
        .sessions
        .read(session_id, |session| {
            session.document.as_ref().and_then(|doc| {
                doc.preview_images
                    .iter()
                    .find(|preview| preview.page == page)
                    .map(|preview| preview.png.clone())
            })
        })
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Preview page {page} not found")))?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

/// PUT /api/v1/sessions/:id/job-description
pub async fn handle_set_job_description(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<JobDescriptionRequest>,
) -> Result<Json<JobDescriptionResponse>, AppError> {
    let word_count = state
        .sessions
        .update(session_id, |session| {
            session.job_description = request.job_description;
            session.job_description_words()
        })
        .await?;
    Ok(Json(JobDescriptionResponse { word_count }))
}
