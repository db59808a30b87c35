//! Prompt Builder: turns an analysis kind, résumé text and job description
//! into the user message sent to the LLM. Pure and deterministic.

use serde::Serialize;

use crate::analysis::catalog::AnalysisKind;

/// Résumé text beyond this many characters is dropped from every prompt.
pub const RESUME_CHAR_CAP: usize = 4000;

/// Job context cap for chat prompts.
pub const JOB_CONTEXT_CHAR_CAP: usize = 1000;

pub const CLOSING_INSTRUCTION: &str =
    "Please provide detailed analysis with specific examples and actionable recommendations.";

pub const CHAT_INSTRUCTION: &str = "\
You are a professional resume consultant. Answer the user's question based ONLY on the following resume content.
Be specific, actionable, and helpful. Use examples from the resume when possible.";

pub const CHAT_CLOSING_INSTRUCTION: &str =
    "Provide a detailed, professional response with specific recommendations.";

const NO_JOB_CONTEXT: &str = "No specific job provided";

/// A fully built prompt, ready for the LLM client.
///
/// `kind` also selects the static guidance used if the call fails.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRequest {
    pub kind: AnalysisKind,
    pub prompt: String,
    /// True when the résumé text was longer than `RESUME_CHAR_CAP`.
    pub resume_truncated: bool,
}

/// Builds the analysis prompt for `kind`.
pub fn build(kind: AnalysisKind, resume_text: &str, job_description: &str) -> AnalysisRequest {
    let (resume, resume_truncated) = truncate_chars(resume_text, RESUME_CHAR_CAP);

    let prompt = format!(
        "{template}\nResume Content:\n{resume}\nJob Description:\n{job_description}\n{CLOSING_INSTRUCTION}",
        template = kind.entry().prompt,
    );

    AnalysisRequest {
        kind,
        prompt,
        resume_truncated,
    }
}

/// Builds the assistant prompt for a free-form question about the résumé.
/// Failures fall back to the overview guidance.
pub fn build_chat(question: &str, resume_text: &str, job_description: &str) -> AnalysisRequest {
    let (resume, resume_truncated) = truncate_chars(resume_text, RESUME_CHAR_CAP);
    let job_context = if job_description.trim().is_empty() {
        NO_JOB_CONTEXT
    } else {
        truncate_chars(job_description, JOB_CONTEXT_CHAR_CAP).0
    };

    let prompt = format!(
        "{CHAT_INSTRUCTION}\nResume Content:\n{resume}\nJob Context (if provided):\n{job_context}\nUser Question: {question}\n{CHAT_CLOSING_INSTRUCTION}",
        question = question.trim(),
    );

    AnalysisRequest {
        kind: AnalysisKind::Overview,
        prompt,
        resume_truncated,
    }
}

/// Returns the first `cap` characters of `text` and whether anything was cut.
pub fn truncate_chars(text: &str, cap: usize) -> (&str, bool) {
    match text.char_indices().nth(cap) {
        Some((byte_index, _)) => (&text[..byte_index], true),
        None => (text, false),
    }
}
