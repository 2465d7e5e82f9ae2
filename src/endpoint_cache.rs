use crate::landing::LandingClient;
use crate::store::PreferenceStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, warn};

/// A cached endpoint payload plus the time it was written.
///
/// The timestamp only matters when a TTL is configured; without one the
/// entry is served indefinitely, matching the portal's original behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    payload: Value,
    cached_at: DateTime<Utc>,
}

impl CacheEntry {
    fn fresh(payload: Value) -> Self {
        Self {
            payload,
            cached_at: Utc::now(),
        }
    }

    fn is_fresh(&self, ttl: Option<Duration>) -> bool {
        match ttl.and_then(|ttl| chrono::Duration::from_std(ttl).ok()) {
            Some(ttl) => Utc::now() - self.cached_at <= ttl,
            None => true,
        }
    }
}

/// Published state of an [`EndpointLoader`].
///
/// `key` names the (endpoint, language) pair the loader currently serves;
/// `data` and `error` follow the same absent-means-render-nothing contract
/// as the session state.
#[derive(Debug, Clone, Default)]
pub struct EndpointState {
    pub key: Option<String>,
    pub data: Option<Value>,
    pub error: Option<String>,
}

/// Store-backed loader for localized payloads from a single portal endpoint
/// at a time.
///
/// Mirrors the session's shape: one writer, state published over a watch
/// channel. Each (endpoint, language) pair is cached durably under a
/// composite key and served from the store before any network call. A load
/// that resolves after the loader has moved on to another key is discarded,
/// never applied.
pub struct EndpointLoader {
    state: watch::Sender<EndpointState>,
    store: PreferenceStore,
    client: LandingClient,
    ttl: Option<Duration>,
}

/// Cache key for one (endpoint, language) pair, e.g. `"orders_en"`.
///
/// Endpoint separators are trimmed so `/orders/` and `orders` share an entry.
pub fn composite_key(endpoint: &str, code: &str) -> String {
    format!("{}_{}", endpoint.trim_matches('/'), code)
}

impl EndpointLoader {
    /// `ttl` bounds how long cached entries are served; `None` keeps them
    /// forever (the original behavior).
    pub fn new(client: LandingClient, store: PreferenceStore, ttl: Option<Duration>) -> Self {
        let (state, _) = watch::channel(EndpointState::default());
        Self {
            state,
            store,
            client,
            ttl,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<EndpointState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> EndpointState {
        self.state.borrow().clone()
    }

    /// Load the payload for `(endpoint, code)` and publish it.
    ///
    /// A fresh cached entry is published with zero network calls; otherwise
    /// exactly one fetch runs, its result is cached under the composite key,
    /// and it is published only if no newer `load` has superseded this one.
    /// Returns the state as published when this load resolved.
    pub async fn load(&self, endpoint: &str, code: &str) -> EndpointState {
        let key = composite_key(endpoint, code);

        self.state.send_modify(|s| {
            s.key = Some(key.clone());
            s.error = None;
        });

        if let Some(entry) = self.cached(&key) {
            debug!("Serving '{}' from cache", key);
            self.state.send_modify(|s| {
                s.data = Some(entry.payload);
                s.error = None;
            });
            return self.snapshot();
        }

        let result = self.client.fetch_endpoint(endpoint, code).await;

        // The language or endpoint may have changed while this fetch was in
        // flight; a superseded result must not be applied.
        let superseded = self.state.borrow().key.as_deref() != Some(key.as_str());

        match result {
            Ok(payload) => {
                self.write_cache(&key, &payload);
                if superseded {
                    debug!("Discarding stale response for '{}'", key);
                } else {
                    self.state.send_modify(|s| {
                        s.data = Some(payload);
                        s.error = None;
                    });
                }
            }
            Err(e) => {
                warn!("Failed to load '{}': {}", key, e);
                if !superseded {
                    self.state.send_modify(|s| {
                        s.error = Some(format!("Failed to load language data: {}", e));
                        s.data = None;
                    });
                }
            }
        }

        self.snapshot()
    }

    /// Drop the cached entry for one (endpoint, language) pair
    pub fn invalidate(&self, endpoint: &str, code: &str) {
        let key = composite_key(endpoint, code);
        if let Err(e) = self.store.remove(&key) {
            warn!("Failed to invalidate '{}': {:#}", key, e);
        }
    }

    fn cached(&self, key: &str) -> Option<CacheEntry> {
        let raw = self.store.get(key)?;
        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Cached entry '{}' is unreadable ({}), refetching", key, e);
                return None;
            }
        };
        entry.is_fresh(self.ttl).then_some(entry)
    }

    fn write_cache(&self, key: &str, payload: &Value) {
        let entry = CacheEntry::fresh(payload.clone());
        match serde_json::to_string(&entry) {
            Ok(raw) => {
                if let Err(e) = self.store.set(key, &raw) {
                    warn!("Failed to cache '{}': {:#}", key, e);
                }
            }
            Err(e) => warn!("Failed to serialize cache entry '{}': {}", key, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_composite_key_normalization() {
        assert_eq!(composite_key("orders", "en"), "orders_en");
        assert_eq!(composite_key("/orders/", "en"), "orders_en");
        assert_eq!(composite_key("customer/invoices", "ru"), "customer/invoices_ru");
    }

    #[test]
    fn test_entry_freshness_without_ttl() {
        let old = CacheEntry {
            payload: json!({}),
            cached_at: Utc::now() - chrono::Duration::days(365),
        };
        // No TTL: entries never expire
        assert!(old.is_fresh(None));
    }

    #[test]
    fn test_entry_freshness_with_ttl() {
        let entry = CacheEntry::fresh(json!({}));
        assert!(entry.is_fresh(Some(Duration::from_secs(60))));

        let stale = CacheEntry {
            payload: json!({}),
            cached_at: Utc::now() - chrono::Duration::hours(2),
        };
        assert!(!stale.is_fresh(Some(Duration::from_secs(3600))));
    }
}
