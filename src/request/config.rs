//! Per-call request configuration.

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::user_agent;

/// Default connect timeout for API requests.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default overall timeout for API requests.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised when a [`RequestConfig`] is unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The instance is not an absolute http(s) URL.
    #[error("invalid instance URL '{instance}': {reason}")]
    InvalidInstance {
        /// The configured instance.
        instance: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The user agent is empty.
    #[error("user agent must not be empty")]
    EmptyUserAgent,
}

/// OAuth 2 access token of an owner-only consumer, sent as a bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthToken {
    access_token: String,
}

impl OAuthToken {
    /// Wraps an access token.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }

    /// Value for the `Authorization` header.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl fmt::Debug for OAuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthToken")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Connect and read timeouts for the HTTP client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub connect: Duration,
    pub read: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect: DEFAULT_CONNECT_TIMEOUT,
            read: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// Settings for one POST: where it goes and how it identifies itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestConfig {
    instance: String,
    user_agent: String,
    bot: bool,
    summary: String,
    oauth: Option<OAuthToken>,
}

impl RequestConfig {
    /// Creates a config for `instance` (e.g. `https://www.wikidata.org`) with
    /// the default user agent, bot mode off and an empty summary.
    pub fn new(instance: impl Into<String>) -> Self {
        let instance = instance.into();
        Self {
            instance: instance.trim_end_matches('/').to_string(),
            user_agent: user_agent::default_user_agent(),
            bot: false,
            summary: String::new(),
            oauth: None,
        }
    }

    /// Sets the User-Agent header value.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Enables bot mode: `bot=true` in the query and `assert=bot` in the body.
    #[must_use]
    pub fn with_bot(mut self, bot: bool) -> Self {
        self.bot = bot;
        self
    }

    /// Sets the edit summary.
    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Attaches an OAuth token to every request.
    #[must_use]
    pub fn with_oauth(mut self, oauth: OAuthToken) -> Self {
        self.oauth = Some(oauth);
        self
    }

    #[must_use]
    pub fn instance(&self) -> &str {
        &self.instance
    }

    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    #[must_use]
    pub fn bot(&self) -> bool {
        self.bot
    }

    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }

    #[must_use]
    pub fn oauth(&self) -> Option<&OAuthToken> {
        self.oauth.as_ref()
    }

    /// Value of the `assert` body field.
    #[must_use]
    pub fn assertion(&self) -> &'static str {
        if self.bot { "bot" } else { "user" }
    }

    /// The `{instance}/w/api.php` endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidInstance`] when the instance does not parse.
    pub fn api_url(&self) -> Result<Url, ConfigError> {
        let url = format!("{}/w/api.php", self.instance);
        Url::parse(&url).map_err(|error| ConfigError::InvalidInstance {
            instance: self.instance.clone(),
            reason: error.to_string(),
        })
    }

    /// Checks the config before any request is made.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a non-http(s) or relative instance, or an
    /// empty user agent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.instance).map_err(|error| ConfigError::InvalidInstance {
            instance: self.instance.clone(),
            reason: error.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidInstance {
                instance: self.instance.clone(),
                reason: format!("scheme '{}' is not supported", url.scheme()),
            });
        }
        if url.host_str().is_none() {
            return Err(ConfigError::InvalidInstance {
                instance: self.instance.clone(),
                reason: "URL has no host".to_string(),
            });
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::EmptyUserAgent);
        }
        Ok(())
    }
}
