use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_GEMINI_MODEL: &str = "gemini-flash-latest";
const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_api_base: String,
    pub llm_timeout: Duration,
    /// Minimum number of characters extraction must yield to count as usable text.
    pub min_text_chars: usize,
    /// Resume text beyond this many characters is cut before prompting.
    pub max_resume_chars: usize,
    pub max_upload_bytes: usize,
    pub skills_taxonomy_path: Option<PathBuf>,
    pub ocr: OcrConfig,
    pub port: u16,
    pub rust_log: String,
}

/// External binaries and settings used by the Tesseract OCR fallback.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub pdftoppm_bin: String,
    pub tesseract_bin: String,
    pub language: String,
    pub dpi: u32,
    /// Limit for each `pdftoppm` / `tesseract` invocation.
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            gemini_model: normalize_model(
                &std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            ),
            gemini_api_base: std::env::var("GEMINI_API_BASE")
                .unwrap_or_else(|_| DEFAULT_GEMINI_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            llm_timeout: Duration::from_secs(parse_env("LLM_TIMEOUT_SECS", 60)?),
            min_text_chars: parse_env("MIN_TEXT_CHARS", 100)?,
            max_resume_chars: parse_env("MAX_RESUME_CHARS", 12_000)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            skills_taxonomy_path: std::env::var("SKILLS_TAXONOMY_PATH").ok().map(PathBuf::from),
            ocr: OcrConfig {
                pdftoppm_bin: std::env::var("PDFTOPPM_BIN")
                    .unwrap_or_else(|_| "pdftoppm".to_string()),
                tesseract_bin: std::env::var("TESSERACT_BIN")
                    .unwrap_or_else(|_| "tesseract".to_string()),
                language: std::env::var("OCR_LANGUAGE").unwrap_or_else(|_| "eng".to_string()),
                dpi: parse_env("OCR_DPI", 300)?,
                timeout: Duration::from_secs(parse_env("OCR_TIMEOUT_SECS", 120)?),
            },
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        Err(_) => Ok(default),
    }
}

/// Accepts both `gemini-flash-latest` and `models/gemini-flash-latest`.
fn normalize_model(model: &str) -> String {
    let model = model.trim();
    model.strip_prefix("models/").unwrap_or(model).to_string()
}
