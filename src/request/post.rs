//! Authenticated POST with one transparent retry on auth failure.
//!
//! A call moves through two states. In [`PostState::FirstAttempt`] it sends
//! with the provider's current credentials; an auth-class API error asks
//! the provider to refresh and moves to [`PostState::Retried`]. Whatever the
//! retried attempt returns is final, so a call sends at most two requests.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use url::form_urlencoded;

use super::auth::{AuthProvider, Credentials};
use super::config::RequestConfig;
use super::error::{RequestError, classify_response};
use super::transport::{ApiRequest, HttpTransport};
use crate::claim::ClaimRequest;

/// Body fields the poster injects; caller-supplied values for them are dropped.
const INJECTED_FIELDS: [&str; 3] = ["token", "summary", "assert"];

/// Position of a call in the retry protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostState {
    FirstAttempt,
    Retried,
}

impl PostState {
    /// State after a failed attempt, or `None` when the failure is final.
    #[must_use]
    pub fn after_failure(self, error: &RequestError) -> Option<Self> {
        match self {
            Self::FirstAttempt if error.is_auth() => Some(Self::Retried),
            Self::FirstAttempt | Self::Retried => None,
        }
    }

    fn attempt_number(self) -> u32 {
        match self {
            Self::FirstAttempt => 1,
            Self::Retried => 2,
        }
    }
}

/// Sends authenticated API POSTs, recovering once from expired credentials.
///
/// The poster never mutates credentials. It reads the provider's latest
/// snapshot before each send and only asks the provider to refresh.
#[derive(Clone)]
pub struct ResilientPoster {
    transport: Arc<dyn HttpTransport>,
    auth: Arc<dyn AuthProvider>,
}

impl std::fmt::Debug for ResilientPoster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientPoster").finish_non_exhaustive()
    }
}

impl ResilientPoster {
    /// Creates a poster over a transport and a credential provider.
    pub fn new(transport: Arc<dyn HttpTransport>, auth: Arc<dyn AuthProvider>) -> Self {
        Self { transport, auth }
    }

    /// POSTs `action` with form fields `data` and returns the response body.
    ///
    /// # Errors
    ///
    /// - [`RequestError::Config`] when the config is invalid (nothing is sent)
    /// - [`RequestError::Credentials`] when the provider cannot supply credentials
    /// - [`RequestError::Transport`] on network, status or decoding failure (no retry)
    /// - [`RequestError::Api`] for a non-auth API error
    /// - [`RequestError::Auth`] when the retried attempt is rejected as well
    #[instrument(skip(self, data, config), fields(instance = %config.instance()))]
    pub async fn post(
        &self,
        action: &str,
        data: &[(String, String)],
        config: &RequestConfig,
    ) -> Result<Value, RequestError> {
        config.validate()?;

        let mut state = PostState::FirstAttempt;
        loop {
            let credentials = self
                .auth
                .credentials()
                .await
                .map_err(|error| RequestError::credentials(action, error))?;

            let outcome = self.attempt(action, data, config, &credentials).await;
            let error = match outcome {
                Ok(body) => {
                    debug!(action, attempt = state.attempt_number(), "POST succeeded");
                    return Ok(body);
                }
                Err(error) => error,
            };

            warn!(
                action,
                attempt = state.attempt_number(),
                error = %error,
                "POST attempt failed"
            );
            let Some(next) = state.after_failure(&error) else {
                return Err(error);
            };

            info!(action, version = credentials.version(), "refreshing credentials before retry");
            if let Err(refresh_error) = self.auth.refresh(&credentials).await {
                // The retry still runs with whatever the provider returns next.
                warn!(action, error = %refresh_error, "credential refresh failed");
            }
            state = next;
        }
    }

    /// POSTs a built claim payload.
    ///
    /// # Errors
    ///
    /// See [`ResilientPoster::post`].
    pub async fn post_claim(
        &self,
        request: &ClaimRequest,
        config: &RequestConfig,
    ) -> Result<Value, RequestError> {
        self.post(request.action, &request.data.form_params(), config)
            .await
    }

    async fn attempt(
        &self,
        action: &str,
        data: &[(String, String)],
        config: &RequestConfig,
        credentials: &Credentials,
    ) -> Result<Value, RequestError> {
        let request = assemble_request(action, data, config, credentials)?;
        let body = self.transport.post(&request).await?;
        match classify_response(&body).into_error(action) {
            Some(error) => Err(error),
            None => Ok(body),
        }
    }
}

/// Assembles the HTTP request for one attempt.
///
/// # Errors
///
/// Returns [`RequestError::Config`] when the API URL cannot be built.
pub fn assemble_request(
    action: &str,
    data: &[(String, String)],
    config: &RequestConfig,
    credentials: &Credentials,
) -> Result<ApiRequest, RequestError> {
    let mut url = config.api_url()?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("action", action);
        query.append_pair("format", "json");
        if config.bot() {
            query.append_pair("bot", "true");
        }
    }

    let mut body = form_urlencoded::Serializer::new(String::new());
    for (key, value) in data {
        if !INJECTED_FIELDS.contains(&key.as_str()) {
            body.append_pair(key, value);
        }
    }
    body.append_pair("token", credentials.token());
    body.append_pair("summary", config.summary());
    body.append_pair("assert", config.assertion());

    Ok(ApiRequest {
        url,
        cookie: credentials.cookie().to_string(),
        user_agent: config.user_agent().to_string(),
        body: body.finish(),
        oauth: config.oauth().cloned(),
    })
}
