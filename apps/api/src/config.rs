use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::DEFAULT_API_BASE;

pub const DEFAULT_LOCAL_STORE: &str = ".resumate/local-store.json";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 3 * 1024 * 1024;
const DEFAULT_FALLBACK_LATENCY_MS: u64 = 300;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_api_base: String,
    /// Build-time default for the remote record store. A runtime override wins.
    pub store_endpoint_url: Option<String>,
    /// File path, `redis://` URL, or `memory`.
    pub local_store: String,
    pub fallback_latency: Duration,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            gemini_api_base: optional_env("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            store_endpoint_url: optional_env("STORE_ENDPOINT_URL"),
            local_store: optional_env("LOCAL_STORE")
                .unwrap_or_else(|| DEFAULT_LOCAL_STORE.to_string()),
            fallback_latency: Duration::from_millis(parse_env(
                "FALLBACK_LATENCY_MS",
                DEFAULT_FALLBACK_LATENCY_MS,
            )?),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank values are both treated as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
