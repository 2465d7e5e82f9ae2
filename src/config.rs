use anyhow::{Context, Result};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Remote portal API
    pub api_base_url: String,
    pub request_timeout: Duration,

    // Localization
    pub default_language: String,

    // Preference store
    pub prefs_path: String,

    // Per-endpoint cache; None means entries never expire
    pub cache_ttl: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            api_base_url: std::env::var("PRASKA_API_URL")
                .context("PRASKA_API_URL not set")?
                .trim_end_matches('/')
                .to_string(),

            request_timeout: Duration::from_secs(
                std::env::var("PRASKA_REQUEST_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10),
            ),

            default_language: std::env::var("PRASKA_DEFAULT_LANG")
                .unwrap_or_else(|_| "cz".to_string()),

            prefs_path: std::env::var("PRASKA_PREFS_PATH")
                .unwrap_or_else(|_| "praska_prefs.json".to_string()),

            cache_ttl: std::env::var("PRASKA_CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs),
        })
    }
}
