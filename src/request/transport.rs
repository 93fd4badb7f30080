//! HTTP transport: the "perform one request" primitive under the poster.
//!
//! [`HttpTransport`] sends a fully assembled [`ApiRequest`] and decodes the
//! JSON body. It knows nothing about API error bodies or retries; those
//! belong to the classifier and the poster.

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, USER_AGENT};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use super::config::{HttpTimeouts, OAuthToken};

/// Content type of every API POST body.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Failures below the API layer: the request never produced a JSON body.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error requesting {url}: {source}")]
    Network {
        /// The URL requested.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout requesting {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Non-success HTTP status.
    #[error("HTTP {status} requesting {url}")]
    HttpStatus {
        /// The URL requested.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The body was not valid JSON.
    #[error("malformed response from {url}: {reason}")]
    MalformedResponse {
        /// The URL requested.
        url: String,
        /// Decoder error.
        reason: String,
    },

    /// The HTTP client could not be constructed.
    #[error("HTTP client construction failed: {source}")]
    Client {
        /// The builder error.
        #[source]
        source: reqwest::Error,
    },
}

impl TransportError {
    /// Creates a network or timeout error from a reqwest error.
    pub fn from_reqwest(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { url: url.into() }
        } else {
            Self::Network {
                url: url.into(),
                source,
            }
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a malformed response error.
    pub fn malformed(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

/// A fully assembled API POST.
#[derive(Clone)]
pub struct ApiRequest {
    /// `{instance}/w/api.php?action=...&format=json[&bot=true]`
    pub url: Url,
    /// Session cookie; omitted from the request when empty.
    pub cookie: String,
    pub user_agent: String,
    /// Form-urlencoded body, including the CSRF token.
    pub body: String,
    /// OAuth descriptor, applied by the transport.
    pub oauth: Option<OAuthToken>,
}

impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRequest")
            .field("url", &self.url.as_str())
            .field("user_agent", &self.user_agent)
            .field("body_len", &self.body.len())
            .field("oauth", &self.oauth.is_some())
            .finish_non_exhaustive()
    }
}

/// Sends API requests.
///
/// # Object Safety
///
/// Uses `async_trait` so posters can hold an `Arc<dyn HttpTransport>`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends `request` and returns the decoded JSON body, error bodies included.
    async fn post(&self, request: &ApiRequest) -> Result<Value, TransportError>;
}

/// [`HttpTransport`] backed by a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with the given timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Client`] when client construction fails.
    pub fn new(timeouts: HttpTimeouts) -> Result<Self, TransportError> {
        Ok(Self {
            client: build_http_client(timeouts)?,
        })
    }

    /// Wraps an existing client.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

/// Builds the shared HTTP client used for API traffic.
///
/// # Errors
///
/// Returns [`TransportError::Client`] when client construction fails.
pub fn build_http_client(timeouts: HttpTimeouts) -> Result<Client, TransportError> {
    Client::builder()
        .connect_timeout(timeouts.connect)
        .timeout(timeouts.read)
        .gzip(true)
        .build()
        .map_err(|source| TransportError::Client { source })
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    #[instrument(skip(self, request), fields(url = %request.url))]
    async fn post(&self, request: &ApiRequest) -> Result<Value, TransportError> {
        let url = request.url.as_str();
        let mut builder = self
            .client
            .post(request.url.clone())
            .header(USER_AGENT, &request.user_agent)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(request.body.clone());
        if !request.cookie.is_empty() {
            builder = builder.header(COOKIE, &request.cookie);
        }
        if let Some(oauth) = &request.oauth {
            builder = builder.header(AUTHORIZATION, oauth.authorization_header());
        }

        let response = builder
            .send()
            .await
            .map_err(|error| TransportError::from_reqwest(url, error))?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "API request returned error status");
            return Err(TransportError::http_status(url, status.as_u16()));
        }

        let text = response
            .text()
            .await
            .map_err(|error| TransportError::from_reqwest(url, error))?;
        serde_json::from_str(&text)
            .map_err(|error| TransportError::malformed(url, error.to_string()))
    }
}
