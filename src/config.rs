//! Runtime configuration.
//!
//! [`FeedConfig`] carries the engine's tuning knobs with the portal's
//! defaults; [`Config`] layers the API location and overrides from the
//! environment (and an optional `.env` file) on top for the CLI.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;

/// Tuning knobs for the feed engine.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Items requested from each source per page.
    pub page_size: u32,
    /// Per-source limit for one fetch; a source that takes longer counts as
    /// failed for that cycle.
    pub fetch_timeout: Duration,
    /// Default interval used by the CLI when polling is switched on.
    pub poll_interval: Duration,
    /// How old an item may be and still be flagged recent.
    pub recent_window: chrono::Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            fetch_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_secs(30),
            recent_window: chrono::Duration::days(crate::normalize::RECENT_WINDOW_DAYS),
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub feed: FeedConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// `base_url_override` (the CLI's first argument) wins over
    /// `FEED_API_BASE_URL`.
    pub fn from_env(base_url_override: Option<String>) -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let defaults = FeedConfig::default();
        let api_base_url = match base_url_override {
            Some(url) => url,
            None => env::var("FEED_API_BASE_URL")
                .context("FEED_API_BASE_URL must be set (or pass the base URL as the first argument)")?,
        };

        Ok(Self {
            api_base_url,
            api_token: env::var("FEED_API_TOKEN").ok().filter(|t| !t.is_empty()),
            feed: FeedConfig {
                page_size: parse_var("FEED_PAGE_SIZE")?.unwrap_or(defaults.page_size),
                fetch_timeout: parse_var("FEED_FETCH_TIMEOUT_SECS")?
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.fetch_timeout),
                poll_interval: parse_var("FEED_POLL_INTERVAL_SECS")?
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.poll_interval),
                recent_window: defaults.recent_window,
            },
        })
    }
}

fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{name} must be a valid number")),
        Err(_) => Ok(None),
    }
}
