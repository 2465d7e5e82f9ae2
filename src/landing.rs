use crate::bundle::LanguageBundle;
use crate::config::Config;
use crate::retry::{with_retry_if, RetryConfig};
use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// A failed retrieval from the portal API.
///
/// These are always reported as values; the session layer converts them into
/// its `error` field rather than letting them escape into consumers.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// Transport failures and server errors are transient; client errors and
    /// malformed payloads will not improve on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Transport { .. } => true,
            FetchError::Status { status, .. } => status.is_server_error(),
            FetchError::Decode { .. } => false,
        }
    }
}

/// HTTP client for the remote portal API.
///
/// Named after the `/landing/` endpoint that serves localization bundles.
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct LandingClient {
    http: reqwest::Client,
    base_url: String,
    retry: RetryConfig,
}

impl LandingClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry: RetryConfig::bundle_fetch(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.api_base_url, config.request_timeout)
    }

    /// Override the retry policy (e.g. `RetryConfig::endpoint_fetch()`)
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the full localization bundle, one document per supported language
    pub async fn fetch_bundle(&self) -> Result<LanguageBundle, FetchError> {
        let url = format!("{}/landing/", self.base_url);
        let value = self.get_json(&url, &[]).await?;
        Self::decode(&url, value)
    }

    /// Fetch the bundle filtered to a single language
    pub async fn fetch_bundle_for(&self, code: &str) -> Result<LanguageBundle, FetchError> {
        let url = format!("{}/landing/", self.base_url);
        let value = self.get_json(&url, &[("lang", code)]).await?;
        Self::decode(&url, value)
    }

    /// Fetch a raw localized payload from an arbitrary portal endpoint
    pub async fn fetch_endpoint(&self, endpoint: &str, code: &str) -> Result<Value, FetchError> {
        let url = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));
        self.get_json(&url, &[("lang", code)]).await
    }

    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<Value, FetchError> {
        with_retry_if(
            &self.retry,
            url,
            || self.get_json_once(url, query),
            FetchError::is_transient,
        )
        .await
    }

    async fn get_json_once(&self, url: &str, query: &[(&str, &str)]) -> Result<Value, FetchError> {
        debug!("GET {} {:?}", url, query);

        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }

    fn decode(url: &str, value: Value) -> Result<LanguageBundle, FetchError> {
        serde_json::from_value(value).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        let server_error = FetchError::Status {
            url: "http://x/landing/".to_string(),
            status: StatusCode::BAD_GATEWAY,
        };
        assert!(server_error.is_transient());

        let client_error = FetchError::Status {
            url: "http://x/landing/".to_string(),
            status: StatusCode::NOT_FOUND,
        };
        assert!(!client_error.is_transient());

        let decode = FetchError::Decode {
            url: "http://x/landing/".to_string(),
            source: serde_json::from_str::<Value>("{").unwrap_err(),
        };
        assert!(!decode.is_transient());
    }

    #[test]
    fn test_error_messages_name_the_url() {
        let err = FetchError::Status {
            url: "http://x/landing/".to_string(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
        };
        let msg = err.to_string();
        assert!(msg.contains("http://x/landing/"));
        assert!(msg.contains("500"));
    }

    #[test]
    fn test_base_url_normalization() {
        let client = LandingClient::new("http://x/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://x");
    }
}
