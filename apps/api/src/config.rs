use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::llm_client::DEFAULT_MAX_RETRIES;
use crate::session::DEFAULT_SESSION_TTL_SECS;

pub const DEFAULT_LLM_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_LLM_MODEL: &str = "llama-3.1-8b-instant";

/// Application configuration loaded from environment variables.
///
/// Nothing here is required: a missing API key degrades analyses to static
/// guidance and missing helper tools select the text-layer extractor.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm_api_key: Option<String>,
    pub llm_api_url: String,
    pub llm_model: String,
    pub llm_max_retries: u32,
    pub llm_retry_delay_ms: u64,
    pub tools: HelperTools,
    pub max_upload_bytes: usize,
    /// Idle time after which a session is evicted.
    pub session_ttl_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

/// Locations of the optional native helpers used for OCR and page previews.
#[derive(Debug, Clone)]
pub struct HelperTools {
    pub pdftoppm: PathBuf,
    pub tesseract: PathBuf,
}

impl Default for HelperTools {
    fn default() -> Self {
        Self {
            pdftoppm: PathBuf::from("pdftoppm"),
            tesseract: PathBuf::from("tesseract"),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            llm_api_key: optional_env("GROQ_API_KEY"),
            llm_api_url: optional_env("LLM_API_URL")
                .unwrap_or_else(|| DEFAULT_LLM_API_URL.to_string()),
            llm_model: optional_env("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            llm_max_retries: parse_env("LLM_MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
            llm_retry_delay_ms: parse_env("LLM_RETRY_DELAY_MS", 0)?,
            tools: helper_tools_from_env(),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            session_ttl_secs: parse_env("SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// `PDFTOPPM_CMD` wins over `POPPLER_PATH`, which names the poppler bin directory.
fn helper_tools_from_env() -> HelperTools {
    let defaults = HelperTools::default();

    let pdftoppm = optional_env("PDFTOPPM_CMD")
        .map(PathBuf::from)
        .or_else(|| optional_env("POPPLER_PATH").map(|dir| PathBuf::from(dir).join("pdftoppm")))
        .unwrap_or(defaults.pdftoppm);

    let tesseract = optional_env("TESSERACT_CMD")
        .map(PathBuf::from)
        .unwrap_or(defaults.tesseract);

    HelperTools {
        pdftoppm,
        tesseract,
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let value: u32 = parse_env("RESUME_REVIEW_TEST_UNSET_VAR", 7).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("RESUME_REVIEW_TEST_BAD_PORT", "eighty");
        let result: Result<u16> = parse_env("RESUME_REVIEW_TEST_BAD_PORT", 8080);
        assert!(result.is_err());
        std::env::remove_var("RESUME_REVIEW_TEST_BAD_PORT");
    }

    #[test]
    fn test_blank_env_is_treated_as_unset() {
        std::env::set_var("RESUME_REVIEW_TEST_BLANK", "   ");
        assert!(optional_env("RESUME_REVIEW_TEST_BLANK").is_none());
        std::env::remove_var("RESUME_REVIEW_TEST_BLANK");
    }
}
