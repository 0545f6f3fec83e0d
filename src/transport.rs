//! Network-caller collaborator for issuing HTTP requests
//!
//! The cache layer treats the transport as an opaque capability: connection
//! handling, TLS, and redirects live behind the [`NetworkCaller`] trait. The
//! built-in [`HttpCaller`] implements it with `reqwest`. Non-2xx statuses are
//! not errors at this layer; the response body is handed back regardless of
//! status, and interpreting it is the caller's business.

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

/// HTTP method used for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    /// Returns the method name as it appears on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// HTTP Basic credentials forwarded verbatim to every network call
#[derive(Clone, PartialEq, Eq)]
pub struct AuthCredentials {
    pub username: String,
    pub password: String,
}

impl AuthCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// Credentials end up in tracing events and panic messages via Debug;
// keep the password out of both.
impl fmt::Debug for AuthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Errors raised by a network caller
///
/// Covers any network-level problem: DNS resolution, connection refused, TLS
/// failures, protocol errors. The cache layer propagates these unchanged,
/// never retries them, and never caches them as negative results.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The underlying HTTP client failed (DNS, connection, TLS, protocol)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A non-HTTP caller implementation reported a failure
    #[error("network call failed: {0}")]
    CallFailed(String),
}

/// Capability for performing a single HTTP request
///
/// Implementations receive the method, URL, optional JSON body (POST only),
/// and optional credentials, and resolve with the raw response body. No
/// timeout is imposed by the cache layer; once issued, a call runs to
/// completion whether or not the original caller still needs the result.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NetworkCaller: Send + Sync {
    async fn perform_request(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
        auth: Option<AuthCredentials>,
    ) -> Result<String, TransportError>;
}

/// `reqwest`-backed implementation of [`NetworkCaller`]
#[derive(Debug, Clone)]
pub struct HttpCaller {
    client: Client,
}

impl HttpCaller {
    /// Creates a caller that validates TLS certificates
    pub fn new() -> Result<Self, TransportError> {
        Self::build(false)
    }

    /// Creates a caller with TLS certificate validation disabled
    ///
    /// Every request through this caller skips certificate verification, so
    /// it will talk to endpoints presenting self-signed or expired
    /// certificates. Opt in via the `accept_invalid_certs` field on
    /// [`crate::client::ClientConfig`] rather than calling this directly.
    pub fn accepting_invalid_certs() -> Result<Self, TransportError> {
        Self::build(true)
    }

    fn build(accept_invalid_certs: bool) -> Result<Self, TransportError> {
        let client = Client::builder()
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl NetworkCaller for HttpCaller {
    async fn perform_request(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
        auth: Option<AuthCredentials>,
    ) -> Result<String, TransportError> {
        let mut request = match method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };

        if let Some(body) = &body {
            request = request.json(body);
        }

        if let Some(auth) = &auth {
            request = request.basic_auth(&auth.username, Some(&auth.password));
        }

        let response = request.send().await?;
        let text = response.text().await?;
        Ok(text)
    }
}
