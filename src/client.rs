//! Response-caching HTTP client
//!
//! Composes the cache store, freshness evaluator, and network caller into a
//! single read path: derive the key, consult the store, serve fresh hits
//! without touching the network, evict stale entries before refreshing, and
//! populate the store only from successful calls.

use std::sync::{Arc, RwLock};

use chrono::{Duration, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::cache::{cache_key, is_fresh, CacheStore, DEFAULT_CACHE_THRESHOLD_MINUTES};
use crate::transport::{AuthCredentials, HttpCaller, Method, NetworkCaller, TransportError};

/// Errors returned by [`CachedClient::get`] and [`CachedClient::post`]
#[derive(Debug, Error)]
pub enum RequestError {
    /// The network call failed; the store was left exactly as it was
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The POST body could not be serialized to JSON
    #[error("failed to serialize request body: {0}")]
    BodySerialization(#[from] serde_json::Error),
}

/// Configuration for a [`CachedClient`]
///
/// All fields are read once at construction and immutable afterward.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Freshness window: entries strictly younger than this are served from
    /// cache, everything else triggers a refresh
    pub cache_threshold: Duration,
    /// Optional HTTP Basic credentials forwarded verbatim to every call
    pub auth: Option<AuthCredentials>,
    /// Identifier carried in log events to disambiguate client instances
    pub instance_id: String,
    /// Disables TLS certificate validation on the built-in transport
    pub accept_invalid_certs: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            cache_threshold: Duration::minutes(DEFAULT_CACHE_THRESHOLD_MINUTES),
            auth: None,
            instance_id: "memofetch".to_string(),
            accept_invalid_certs: false,
        }
    }
}

impl ClientConfig {
    /// Sets the freshness window in minutes
    pub fn with_threshold_minutes(mut self, minutes: i64) -> Self {
        self.cache_threshold = Duration::minutes(minutes);
        self
    }

    /// Sets HTTP Basic credentials to forward with every call
    pub fn with_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Some(AuthCredentials::new(username, password));
        self
    }

    /// Sets the identifier carried in this client's log events
    pub fn with_instance_id(mut self, instance_id: impl Into<String>) -> Self {
        self.instance_id = instance_id.into();
        self
    }
}

/// Response-caching HTTP client
///
/// Memoizes GET/POST outcomes keyed by URL (and serialized body for POST).
/// A fresh entry is served without a network call; a stale entry is evicted
/// and the call re-issued; a failed call propagates its error and leaves the
/// store untouched. Each client owns its store exclusively - clones share the
/// same store, separate clients never do.
///
/// Concurrent calls for the same absent or stale key are not coalesced: each
/// goes to the network and the last successful write wins, matching the
/// behavior of a sequential caller that never overlaps requests.
#[derive(Debug)]
pub struct CachedClient<C = HttpCaller> {
    caller: Arc<C>,
    store: Arc<RwLock<CacheStore>>,
    config: ClientConfig,
}

impl<C> Clone for CachedClient<C> {
    fn clone(&self) -> Self {
        Self {
            caller: Arc::clone(&self.caller),
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

impl CachedClient<HttpCaller> {
    /// Creates a client backed by the built-in `reqwest` transport
    ///
    /// # Errors
    /// Returns a [`TransportError`] if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(config: ClientConfig) -> Result<Self, TransportError> {
        let caller = if config.accept_invalid_certs {
            HttpCaller::accepting_invalid_certs()?
        } else {
            HttpCaller::new()?
        };
        Ok(Self::with_caller(caller, config))
    }
}

impl<C: NetworkCaller> CachedClient<C> {
    /// Creates a client with a custom network caller
    ///
    /// Useful for testing, or for routing requests through a transport other
    /// than the built-in one.
    pub fn with_caller(caller: C, config: ClientConfig) -> Self {
        Self {
            caller: Arc::new(caller),
            store: Arc::new(RwLock::new(CacheStore::new())),
            config,
        }
    }

    /// Fetches `url`, serving a cached response if one is still fresh
    ///
    /// # Returns
    /// * `Ok(String)` - The response body, cached or freshly fetched
    /// * `Err(RequestError)` - If the network call fails
    pub async fn get(&self, url: &str) -> Result<String, RequestError> {
        self.execute(Method::Get, url, None).await
    }

    /// Posts `body` to `url`, serving a cached response if one is still fresh
    ///
    /// The cache key incorporates the serialized body, so two POSTs to the
    /// same URL with different bodies never satisfy each other's lookup.
    ///
    /// # Returns
    /// * `Ok(String)` - The response body, cached or freshly fetched
    /// * `Err(RequestError)` - If the body cannot be serialized or the
    ///   network call fails
    pub async fn post<T: Serialize>(&self, url: &str, body: &T) -> Result<String, RequestError> {
        let body = serde_json::to_value(body)?;
        self.execute(Method::Post, url, Some(body)).await
    }

    /// Read path shared by `get` and `post`
    async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
    ) -> Result<String, RequestError> {
        let key = cache_key(url, body.as_ref());

        if let Some(value) = self.check_cache(&key, url) {
            return Ok(value);
        }

        self.request(method, url, body, &key).await
    }

    /// Probes the store under `key`, evicting a stale entry if one is found
    ///
    /// Eviction happens before the refresh attempt, so a subsequent failed
    /// network call leaves the key cold rather than stale-but-present.
    fn check_cache(&self, key: &str, url: &str) -> Option<String> {
        let mut store = self.store.write().unwrap();

        // Probe with an immutable borrow first; eviction below needs the
        // store mutably. `now` is sampled once per lookup.
        let now = Utc::now();
        let probed = store
            .lookup(key)
            .map(|entry| (is_fresh(entry.stored_at, self.config.cache_threshold, now), entry.value.clone()));

        match probed {
            Some((true, value)) => {
                info!(instance = %self.config.instance_id, url, "has a valid cache");
                Some(value)
            }
            Some((false, _)) => {
                info!(instance = %self.config.instance_id, url, "has a cache but it expired");
                store.evict(key);
                None
            }
            None => {
                info!(instance = %self.config.instance_id, url, "has no cache");
                None
            }
        }
    }

    /// Issues the network call and populates the store on success
    ///
    /// Failures propagate unchanged: no retry, no negative caching, no store
    /// mutation of any kind.
    async fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
        key: &str,
    ) -> Result<String, RequestError> {
        info!(
            instance = %self.config.instance_id,
            url,
            method = method.as_str(),
            "request started"
        );

        match self
            .caller
            .perform_request(method, url, body, self.config.auth.clone())
            .await
        {
            Ok(response) => {
                info!(instance = %self.config.instance_id, url, "request success");
                self.store
                    .write()
                    .unwrap()
                    .put(key.to_string(), response.clone());
                Ok(response)
            }
            Err(err) => {
                warn!(instance = %self.config.instance_id, url, error = %err, "request error");
                Err(err.into())
            }
        }
    }
}
