use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

const DEFAULT_MODEL_API_URL: &str = "http://localhost:8000/v1/chat/completions";

/// When AI analysis of an uploaded document runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingMode {
    /// The upload request waits for extraction and returns the terminal row.
    Inline,
    /// Extraction runs on a detached task; the upload returns the pending row.
    Background,
}

impl FromStr for ProcessingMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inline" | "sync" => Ok(ProcessingMode::Inline),
            "background" | "async" => Ok(ProcessingMode::Background),
            other => Err(anyhow!(
                "DOCUMENT_PROCESSING must be 'inline' or 'background', got '{other}'"
            )),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub model_api_url: String,
    pub model_api_key: String,
    pub model_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
    pub upload_dir: PathBuf,
    pub upload_max_bytes: usize,
    /// Lower-case extensions without the dot.
    pub upload_allowed_extensions: Vec<String>,
    pub document_processing: ProcessingMode,
    pub simulated_stream_delay: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            model_api_url: optional_env("MODEL_API_URL", DEFAULT_MODEL_API_URL),
            model_api_key: require_env("MODEL_API_KEY")?,
            model_timeout: Duration::from_secs(
                parse_env("MODEL_TIMEOUT_SECS", "30")
                    .context("MODEL_TIMEOUT_SECS must be a number of seconds")?,
            ),
            port: parse_env("PORT", "8080").context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG", "info"),
            upload_dir: PathBuf::from(optional_env("UPLOAD_DIR", "./uploads")),
            upload_max_bytes: parse_env("UPLOAD_MAX_BYTES", "10485760")
                .context("UPLOAD_MAX_BYTES must be a byte count")?,
            upload_allowed_extensions: parse_extensions(&optional_env(
                "UPLOAD_ALLOWED_EXTENSIONS",
                "md",
            )),
            document_processing: parse_env("DOCUMENT_PROCESSING", "inline")?,
            simulated_stream_delay: Duration::from_millis(
                parse_env("SIMULATED_STREAM_DELAY_MS", "50")
                    .context("SIMULATED_STREAM_DELAY_MS must be a number of milliseconds")?,
            ),
        })
    }

    pub fn is_allowed_extension(&self, extension: &str) -> bool {
        let extension = extension.trim_start_matches('.').to_ascii_lowercase();
        self.upload_allowed_extensions.contains(&extension)
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = optional_env(key, default);
    raw.trim()
        .parse::<T>()
        .map_err(|e| anyhow!("invalid value '{raw}' for {key}: {e}"))
}

fn parse_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

#[cfg(test)]
impl Config {
    /// Configuration for unit tests; nothing is read from the environment.
    pub fn for_tests(model_api_url: String, upload_dir: PathBuf) -> Self {
        Config {
            database_url: "postgres://unused".to_string(),
            model_api_url,
            model_api_key: "test-key".to_string(),
            model_timeout: Duration::from_secs(5),
            port: 0,
            rust_log: "debug".to_string(),
            upload_dir,
            upload_max_bytes: 1024 * 1024,
            upload_allowed_extensions: vec!["md".to_string()],
            document_processing: ProcessingMode::Inline,
            simulated_stream_delay: Duration::from_millis(1),
        }
    }
}
