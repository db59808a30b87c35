//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::catalog::AnalysisKind;
use crate::analysis::pipeline::{run_analysis, validate_inputs, AnalysisRecord};
use crate::errors::AppError;
use crate::report::to_document;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct KindInfo {
    pub kind: AnalysisKind,
    pub title: &'static str,
    pub description: &'static str,
}

/// `kind` is taken as a string so that unknown kinds surface as a
/// validation error rather than a body rejection.
#[derive(Debug, Deserialize)]
pub struct AnalysisRunRequest {
    pub kind: String,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    #[serde(flatten)]
    pub record: AnalysisRecord,
    pub retry_available: bool,
    pub report_url: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/analysis/kinds
pub async fn handle_list_kinds() -> Json<Vec<KindInfo>> {
    Json(
        AnalysisKind::ALL
            .into_iter()
            .map(|kind| KindInfo {
                kind,
                title: kind.title(),
                description: kind.entry().description,
            })
            .collect(),
    )
}

/// POST /api/v1/sessions/:id/analysis
///
/// Runs one analysis against the session's résumé and job description.
/// LLM trouble degrades to static guidance; only missing inputs are errors.
pub async fn handle_run_analysis(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<AnalysisRunRequest>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let kind = AnalysisKind::parse(&request.kind).ok_or_else(|| {
        AppError::Validation(format!("Unknown analysis kind '{}'", request.kind))
    })?;

    let (resume_text, job_description, generation) = state
        .sessions
        .read(session_id, |session| {
            (
                session.resume_text().to_string(),
                session.job_description.clone(),
                session.generation,
            )
        })
        .await?;

    validate_inputs(&resume_text, &job_description)?;

    let record = run_analysis(
        &state.llm,
        state.config.llm_max_retries,
        kind,
        &resume_text,
        &job_description,
    )
    .await;

    let stored = state
        .sessions
        .update(session_id, |session| {
            session.store_result(generation, record.clone())
        })
        .await?;
    if !stored {
        tracing::info!(
            %session_id,
            kind = kind.slug(),
            "Résumé replaced during analysis, result not stored"
        );
    }

    Ok(Json(AnalysisResponse {
        retry_available: record.retry_available(),
        report_url: format!(
            "/api/v1/sessions/{session_id}/analysis/{}/report",
            kind.slug()
        ),
        record,
    }))
}

/// GET /api/v1/sessions/:id/analysis/:kind/report
///
/// Renders the stored result of `kind` as a PDF attachment.
pub async fn handle_download_report(
    State(state): State<AppState>,
    Path((session_id, kind)): Path<(Uuid, String)>,
) -> Result<Response, AppError> {
    let kind = AnalysisKind::parse(&kind)
        .ok_or_else(|| AppError::Validation(format!("Unknown analysis kind '{kind}'")))?;

    let sections = state
        .sessions
        .read(session_id, |session| {
            session.results.get(&kind).map(AnalysisRecord::report_sections)
        })
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("No {} result yet, run the analysis first", kind.title()))
        })?;

    let pdf = tokio::task::spawn_blocking(move || to_document(&sections))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;

    let disposition = format!("attachment; filename=\"{}\"", kind.report_filename());
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf,
    )
        .into_response())
}
