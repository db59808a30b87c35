//! Analysis pipeline: prompt → LLM → (answer | static guidance) → markup.
//!
//! LLM trouble never becomes an error here. A degraded or failed call is
//! replaced by the catalog's fallback guidance plus a notice, and the result
//! is flagged `retry_available` so the client can offer a manual retry.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::analysis::catalog::AnalysisKind;
use crate::analysis::prompts::{build, AnalysisRequest};
use crate::errors::AppError;
use crate::formatting::format;
use crate::llm_client::{AnalysisOutcome, LlmClient};
use crate::report::ReportSection;

pub const DEGRADED_NOTICE: &str =
    "API connection issues detected. Showing manual analysis guidelines.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeLabel {
    Success,
    Degraded,
    Failure,
}

/// One analysed section, ready for display and for the PDF report.
#[derive(Debug, Clone, Serialize)]
pub struct SectionResult {
    pub kind: AnalysisKind,
    pub title: &'static str,
    pub outcome: OutcomeLabel,
    /// Model answer on success, fallback guidance otherwise.
    pub text: String,
    pub markup: String,
    pub notice: Option<String>,
    pub retry_available: bool,
}

/// Stored result of one analysis run. `Complete` holds four sections.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRecord {
    pub kind: AnalysisKind,
    pub sections: Vec<SectionResult>,
    pub resume_truncated: bool,
    pub completed_at: DateTime<Utc>,
}

impl AnalysisRecord {
    pub fn retry_available(&self) -> bool {
        self.sections.iter().any(|s| s.retry_available)
    }

    /// Section map for the PDF writer, in run order.
    pub fn report_sections(&self) -> Vec<ReportSection> {
        self.sections
            .iter()
            .map(|s| ReportSection::new(s.title, s.text.clone()))
            .collect()
    }
}

/// Both inputs must be present before any analysis runs. All missing inputs
/// are reported together.
pub fn validate_inputs(resume_text: &str, job_description: &str) -> Result<(), AppError> {
    let mut problems = Vec::new();
    if resume_text.trim().is_empty() {
        problems.push("Please upload a resume first");
    }
    if job_description.trim().is_empty() {
        problems.push("Please provide a job description");
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(problems.join("; ")))
    }
}

/// Runs `kind`. `Complete` runs its four steps strictly one after another.
pub async fn run_analysis(
    llm: &LlmClient,
    max_retries: u32,
    kind: AnalysisKind,
    resume_text: &str,
    job_description: &str,
) -> AnalysisRecord {
    let steps: &[AnalysisKind] = match kind {
        AnalysisKind::Complete => &AnalysisKind::COMPLETE_STEPS,
        _ => std::slice::from_ref(&kind),
    };

    let mut sections = Vec::with_capacity(steps.len());
    let mut resume_truncated = false;

    for (index, step) in steps.iter().enumerate() {
        let request = build(*step, resume_text, job_description);
        resume_truncated |= request.resume_truncated;

        let section = run_step(llm, max_retries, &request).await;
        if kind == AnalysisKind::Complete {
            info!(
                "Complete analysis: {} done ({}/{})",
                step.title(),
                index + 1,
                steps.len()
            );
        }
        sections.push(section);
    }

    AnalysisRecord {
        kind,
        sections,
        resume_truncated,
        completed_at: Utc::now(),
    }
}

async fn run_step(llm: &LlmClient, max_retries: u32, request: &AnalysisRequest) -> SectionResult {
    info!("Analyzing: {}", request.kind.title());
    let outcome = llm.analyze(request, max_retries).await;
    resolve(request.kind, outcome)
}

/// Turns an outcome into displayable content, substituting guidance on
/// anything but success.
pub fn resolve(kind: AnalysisKind, outcome: AnalysisOutcome) -> SectionResult {
    let (label, text, notice) = match outcome {
        AnalysisOutcome::Success(text) => (OutcomeLabel::Success, text, None),
        AnalysisOutcome::Degraded(guidance_kind) => (
            OutcomeLabel::Degraded,
            guidance_kind.entry().fallback.to_string(),
            Some(DEGRADED_NOTICE.to_string()),
        ),
        AnalysisOutcome::Failure(error) => {
            warn!("{} fell back to guidance: {error}", kind.title());
            (
                OutcomeLabel::Failure,
                kind.entry().fallback.to_string(),
                Some(format!(
                    "Analysis failed: {error}. Showing manual analysis guidelines."
                )),
            )
        }
    };

    SectionResult {
        kind,
        title: kind.title(),
        outcome: label,
        markup: format(&text),
        text,
        notice,
        retry_available: label != OutcomeLabel::Success,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::llm_client::mock::ScriptedBackend;
    use crate::llm_client::{BackendStatus, ChatBackend};

    fn client(backend: Arc<ScriptedBackend>) -> LlmClient {
        LlmClient::new(Some(backend as Arc<dyn ChatBackend>), "test-model")
    }

    #[test]
    fn test_validate_inputs_joins_messages() {
        let err = validate_inputs("", "  ").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: Please upload a resume first; Please provide a job description"
        );
        assert!(validate_inputs("resume", "job").is_ok());
    }

    #[test]
    fn test_validate_inputs_missing_job_description() {
        let err = validate_inputs("Jane Doe, Rust engineer", "").unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "Please provide a job description"));
    }

    #[tokio::test]
    async fn test_single_analysis_success() {
        let backend = Arc::new(ScriptedBackend::answering(
            "Strengths:\n[STRENGTH] Solid Rust experience",
        ));
        let llm = client(backend.clone());

        let record = run_analysis(&llm, 3, AnalysisKind::Overview, "resume", "job").await;
        assert_eq!(record.sections.len(), 1);
        let section = &record.sections[0];
        assert_eq!(section.outcome, OutcomeLabel::Success);
        assert_eq!(section.title, "Quick Overview");
        assert_eq!(section.markup, "Strengths:<br>Solid Rust experience");
        assert!(section.notice.is_none());
        assert!(!record.retry_available());
        assert!(!record.resume_truncated);
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_complete_runs_four_steps_in_order() {
        let backend = Arc::new(ScriptedBackend::answering("A thorough answer"));
        let llm = client(backend.clone());

        let record = run_analysis(&llm, 3, AnalysisKind::Complete, "resume", "job").await;
        let kinds: Vec<AnalysisKind> = record.sections.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, AnalysisKind::COMPLETE_STEPS.to_vec());
        assert_eq!(record.kind, AnalysisKind::Complete);
        assert_eq!(backend.calls(), 4);
        assert_eq!(record.report_sections()[3].title, "Job Matching");
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_guidance() {
        let backend = Arc::new(ScriptedBackend::always_failing());
        let llm = client(backend.clone());

        let record = run_analysis(&llm, 2, AnalysisKind::Tips, "resume", "job").await;
        let section = &record.sections[0];
        assert_eq!(section.outcome, OutcomeLabel::Failure);
        assert_eq!(section.text, AnalysisKind::Tips.entry().fallback);
        assert!(section.notice.as_deref().unwrap().starts_with("Analysis failed"));
        assert!(record.retry_available());
        assert_eq!(backend.calls(), 2);
    }

    #[tokio::test]
    async fn test_degraded_backend_skips_calls() {
        let backend = Arc::new(ScriptedBackend::always_failing());
        let llm = client(backend.clone()).with_status(BackendStatus::Unreachable);

        let record = run_analysis(&llm, 3, AnalysisKind::Complete, "resume", "job").await;
        assert_eq!(record.sections.len(), 4);
        assert!(record
            .sections
            .iter()
            .all(|s| s.outcome == OutcomeLabel::Degraded
                && s.notice.as_deref() == Some(DEGRADED_NOTICE)));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_long_resume_is_flagged_truncated() {
        let backend = Arc::new(ScriptedBackend::answering("A thorough answer"));
        let llm = client(backend);
        let resume = "x".repeat(5000);

        let record = run_analysis(&llm, 1, AnalysisKind::Issues, &resume, "job").await;
        assert!(record.resume_truncated);
    }
}
