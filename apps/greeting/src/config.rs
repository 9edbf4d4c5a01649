use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::genai_client::DEFAULT_API_BASE;

/// Whether a text card shows its canned text or asks the text model on mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardSource {
    Static,
    Generated,
}

impl FromStr for CardSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "static" => Ok(CardSource::Static),
            "generated" => Ok(CardSource::Generated),
            other => bail!("expected 'static' or 'generated', got '{other}'"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    Generated,
    Disabled,
}

impl FromStr for ImageSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "generated" => Ok(ImageSource::Generated),
            "disabled" => Ok(ImageSource::Disabled),
            other => bail!("expected 'generated' or 'disabled', got '{other}'"),
        }
    }
}

/// Per-deployment choice of which cards are dynamic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardSources {
    pub poem: CardSource,
    pub forecast: CardSource,
    pub history: CardSource,
    pub image: ImageSource,
}

impl Default for CardSources {
    fn default() -> Self {
        Self {
            poem: CardSource::Static,
            forecast: CardSource::Static,
            history: CardSource::Static,
            image: ImageSource::Generated,
        }
    }
}

/// Application configuration loaded from environment variables.
///
/// The API key is the only secret and it is optional: without it the service
/// still starts, and every generative call fails fast as "not configured".
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub gemini_api_base: String,
    pub sources: CardSources,
    pub session_wait_max_ms: u64,
    /// Sessions not touched for this long are evicted from the store.
    pub session_idle_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: optional_env("GEMINI_API_KEY").or_else(|| optional_env("API_KEY")),
            gemini_api_base: optional_env("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            sources: CardSources {
                poem: parse_env("POEM_SOURCE", CardSource::Static)?,
                forecast: parse_env("FORECAST_SOURCE", CardSource::Static)?,
                history: parse_env("HISTORY_SOURCE", CardSource::Static)?,
                image: parse_env("IMAGE_SOURCE", ImageSource::Generated)?,
            },
            session_wait_max_ms: std::env::var("SESSION_WAIT_MAX_MS")
                .unwrap_or_else(|_| "30000".to_string())
                .parse::<u64>()
                .context("SESSION_WAIT_MAX_MS must be a number of milliseconds")?,
            session_idle_timeout: parse_idle_timeout(
                &std::env::var("SESSION_IDLE_TIMEOUT_SECS").unwrap_or_else(|_| "1800".to_string()),
            )?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Reads an env var, treating an empty value the same as an unset one.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_idle_timeout(raw: &str) -> Result<Duration> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .context("SESSION_IDLE_TIMEOUT_SECS must be a number of seconds")?;
    if secs == 0 {
        bail!("SESSION_IDLE_TIMEOUT_SECS must be greater than zero");
    }
    Ok(Duration::from_secs(secs))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr<Err = anyhow::Error>,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Invalid value for environment variable '{key}'")),
        None => Ok(default),
    }
}
