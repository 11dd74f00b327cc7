use std::str::FromStr;

use anyhow::{bail, Context, Result};

const DEFAULT_PORT: u16 = 8501;
const DEFAULT_CHAT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_EMBEDDING_MODEL: &str = "models/embedding-001";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Startup fails if `GOOGLE_API_KEY` is missing or a numeric variable is malformed.
#[derive(Clone)]
pub struct Config {
    pub google_api_key: String,
    pub chat_model: String,
    pub embedding_model: String,
    pub port: u16,
    pub rust_log: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// Passages retrieved per chat question.
    pub chat_top_k: usize,
    /// Passages retrieved when ranking candidates against a job description.
    pub rank_top_k: usize,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            google_api_key: require_env("GOOGLE_API_KEY")?,
            chat_model: optional_env("CHAT_MODEL", DEFAULT_CHAT_MODEL),
            embedding_model: optional_env("EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL),
            port: parse_env("PORT", DEFAULT_PORT)?,
            rust_log: optional_env("RUST_LOG", "info"),
            chunk_size: parse_env("CHUNK_SIZE", 1000)?,
            chunk_overlap: parse_env("CHUNK_OVERLAP", 100)?,
            chat_top_k: parse_env("CHAT_TOP_K", 5)?,
            rank_top_k: parse_env("RANK_TOP_K", 20)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        };

        if config.chunk_overlap >= config.chunk_size {
            bail!(
                "CHUNK_OVERLAP ({}) must be smaller than CHUNK_SIZE ({})",
                config.chunk_overlap,
                config.chunk_size
            );
        }

        Ok(config)
    }
}

fn require_env(key: &str) -> Result<String> {
    let value = std::env::var(key)
        .with_context(|| format!("Required environment variable '{key}' is not set"))?;
    if value.trim().is_empty() {
        bail!("Required environment variable '{key}' is empty");
    }
    Ok(value)
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("{key} must be a valid number, got '{raw}'"))
}
