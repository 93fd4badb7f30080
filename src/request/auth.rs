//! Session credentials and the provider that owns them.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

/// Immutable snapshot of the session credentials.
///
/// The provider hands out a fresh snapshot on every call; `version`
/// increases each time the provider replaces its credentials, so a caller
/// can tell which snapshot a failed request used.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    cookie: String,
    token: String,
    version: u64,
}

impl Credentials {
    /// Creates a snapshot.
    pub fn new(cookie: impl Into<String>, token: impl Into<String>, version: u64) -> Self {
        Self {
            cookie: cookie.into(),
            token: token.into(),
            version,
        }
    }

    /// Session cookie header value (may be empty for OAuth sessions).
    #[must_use]
    pub fn cookie(&self) -> &str {
        &self.cookie
    }

    /// CSRF token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("cookie", &"<redacted>")
            .field("token", &"<redacted>")
            .field("version", &self.version)
            .finish()
    }
}

/// Errors raised while obtaining credentials.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The instance refused the login.
    #[error("login to {instance} failed: {reason}")]
    LoginFailed {
        /// The instance logged into.
        instance: String,
        /// Result or error code reported by the API.
        reason: String,
    },

    /// A token query did not return the expected token.
    #[error("could not obtain {kind} token from {instance}: {reason}")]
    MissingToken {
        /// The instance queried.
        instance: String,
        /// `login` or `csrf`.
        kind: &'static str,
        /// What was wrong with the response.
        reason: String,
    },

    /// Network-level error while talking to the instance.
    #[error("network error during authentication with {url}: {source}")]
    Network {
        /// The URL requested.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The provider cannot produce credentials for another reason.
    #[error("credentials unavailable: {reason}")]
    Unavailable {
        /// Why.
        reason: String,
    },
}

impl AuthError {
    /// Creates a login failure error.
    pub fn login_failed(instance: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::LoginFailed {
            instance: instance.into(),
            reason: reason.into(),
        }
    }

    /// Creates a missing token error.
    pub fn missing_token(
        instance: impl Into<String>,
        kind: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::MissingToken {
            instance: instance.into(),
            kind,
            reason: reason.into(),
        }
    }

    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a generic unavailability error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}

/// Source of session credentials.
///
/// Implementations own the mutable credential state. `refresh` must be
/// idempotent and safe under concurrent callers: refreshing a snapshot that
/// was already replaced is a no-op.
///
/// # Object Safety
///
/// Uses `async_trait` so posters can hold an `Arc<dyn AuthProvider>`.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Returns the latest credentials, logging in first if there are none yet.
    async fn credentials(&self) -> Result<Credentials, AuthError>;

    /// Replaces the credentials if `stale` is still the current snapshot.
    async fn refresh(&self, stale: &Credentials) -> Result<(), AuthError>;
}
