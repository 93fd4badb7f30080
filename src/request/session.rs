//! Session-backed [`AuthProvider`] for a MediaWiki/Wikibase instance.
//!
//! Bot-password login runs the three-step action API flow:
//! 1. `action=query&meta=tokens&type=login` for a login token
//! 2. `action=login` with `lgname`, `lgpassword`, `lgtoken`
//! 3. `action=query&meta=tokens&type=csrf` for the edit token
//!
//! `Set-Cookie` values from every step go into a per-login cookie jar, and
//! what the jar would send to the API becomes the snapshot's `Cookie` header.
//! OAuth 2 sessions skip steps 1 and 2 and fetch the CSRF token with the
//! bearer token.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{
    AUTHORIZATION, CONTENT_TYPE, COOKIE, HeaderMap, HeaderValue, SET_COOKIE, USER_AGENT,
};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};
use url::{Url, form_urlencoded};

use super::auth::{AuthError, AuthProvider, Credentials};
use super::config::{HttpTimeouts, OAuthToken, RequestConfig};
use super::transport::{FORM_CONTENT_TYPE, build_http_client};

/// CSRF token MediaWiki hands to sessions that are not logged in.
const ANONYMOUS_CSRF_TOKEN: &str = "+\\";

/// How the provider authenticates.
#[derive(Clone)]
pub enum LoginMethod {
    /// Bot password (`User@BotName` + generated password) or main account login.
    BotPassword { username: String, password: String },
    /// OAuth 2 owner-only consumer.
    OAuth(OAuthToken),
}

impl fmt::Debug for LoginMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BotPassword { username, .. } => f
                .debug_struct("BotPassword")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::OAuth(token) => f.debug_tuple("OAuth").field(token).finish(),
        }
    }
}

#[derive(Debug, Default)]
struct SessionState {
    current: Option<Credentials>,
    last_version: u64,
}

/// Logs into an instance and keeps the resulting session credentials.
///
/// The state mutex is held across a login, so concurrent `credentials` and
/// `refresh` calls share a single login instead of racing.
pub struct SessionAuthProvider {
    client: Client,
    instance: String,
    user_agent: String,
    method: LoginMethod,
    state: Mutex<SessionState>,
}

impl fmt::Debug for SessionAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionAuthProvider")
            .field("instance", &self.instance)
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

/// Cookie jar for a single login, scoped to the action API endpoint.
///
/// Every login starts from an empty jar, so cookies from an expired session
/// never leak into the next one.
#[derive(Debug)]
struct LoginCookies {
    jar: Arc<Jar>,
    url: Url,
}

impl LoginCookies {
    fn new(url: Url) -> Self {
        Self {
            jar: Arc::new(Jar::default()),
            url,
        }
    }

    /// Stores every `Set-Cookie` header, honoring `Expires` and `Max-Age`.
    fn absorb(&self, headers: &HeaderMap) {
        let mut set_cookies = headers.get_all(SET_COOKIE).iter();
        self.jar.set_cookies(&mut set_cookies, &self.url);
    }

    /// The `Cookie` header the jar would send to the API, or `None` when empty.
    fn header(&self) -> Option<HeaderValue> {
        self.jar.cookies(&self.url)
    }

    fn header_value(&self) -> String {
        self.header()
            .and_then(|value| value.to_str().map(str::to_string).ok())
            .unwrap_or_default()
    }
}

impl SessionAuthProvider {
    /// Creates a provider for the instance and user agent in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unavailable`] when the HTTP client cannot be built.
    pub fn new(config: &RequestConfig, method: LoginMethod) -> Result<Self, AuthError> {
        let client = build_http_client(HttpTimeouts::default())
            .map_err(|error| AuthError::unavailable(error.to_string()))?;
        Ok(Self::with_client(client, config, method))
    }

    /// Creates a provider over an existing client.
    #[must_use]
    pub fn with_client(client: Client, config: &RequestConfig, method: LoginMethod) -> Self {
        Self {
            client,
            instance: config.instance().to_string(),
            user_agent: config.user_agent().to_string(),
            method,
            state: Mutex::new(SessionState::default()),
        }
    }

    fn api_base(&self) -> Result<Url, AuthError> {
        Url::parse(&format!("{}/w/api.php", self.instance))
            .map_err(|error| AuthError::unavailable(format!("invalid instance URL: {error}")))
    }

    fn api_url(&self, params: &[(&str, &str)]) -> Result<Url, AuthError> {
        let mut url = self.api_base()?;
        url.query_pairs_mut().extend_pairs(params);
        Ok(url)
    }

    fn authorize(&self, builder: RequestBuilder, cookies: &LoginCookies) -> RequestBuilder {
        let mut builder = builder.header(USER_AGENT, &self.user_agent);
        if let Some(cookie) = cookies.header() {
            builder = builder.header(COOKIE, cookie);
        }
        if let LoginMethod::OAuth(token) = &self.method {
            builder = builder.header(AUTHORIZATION, token.authorization_header());
        }
        builder
    }

    async fn send(
        &self,
        builder: RequestBuilder,
        url: &Url,
        cookies: &LoginCookies,
    ) -> Result<Value, AuthError> {
        let response = builder
            .send()
            .await
            .map_err(|error| AuthError::network(url.as_str(), error))?;
        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::unavailable(format!(
                "HTTP {} from {}",
                status.as_u16(),
                url.path()
            )));
        }
        cookies.absorb(response.headers());
        response
            .json()
            .await
            .map_err(|error| AuthError::network(url.as_str(), error))
    }

    async fn fetch_token(
        &self,
        kind: &'static str,
        cookies: &LoginCookies,
    ) -> Result<String, AuthError> {
        let url = self.api_url(&[
            ("action", "query"),
            ("meta", "tokens"),
            ("type", kind),
            ("format", "json"),
        ])?;
        let builder = self.authorize(self.client.get(url.clone()), cookies);
        let body = self.send(builder, &url, cookies).await?;

        if let Some(error) = body.get("error") {
            return Err(AuthError::missing_token(
                &self.instance,
                kind,
                error_code(error),
            ));
        }
        let field = format!("{kind}token");
        body.pointer(&format!("/query/tokens/{field}"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                AuthError::missing_token(&self.instance, kind, format!("response has no {field}"))
            })
    }

    async fn bot_password_login(
        &self,
        username: &str,
        password: &str,
        cookies: &LoginCookies,
    ) -> Result<(), AuthError> {
        let login_token = self.fetch_token("login", cookies).await?;

        let url = self.api_url(&[("action", "login"), ("format", "json")])?;
        let form = form_urlencoded::Serializer::new(String::new())
            .append_pair("lgname", username)
            .append_pair("lgpassword", password)
            .append_pair("lgtoken", &login_token)
            .finish();
        let builder = self
            .authorize(self.client.post(url.clone()), cookies)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(form);
        let body = self.send(builder, &url, cookies).await?;

        if let Some(error) = body.get("error") {
            return Err(AuthError::login_failed(&self.instance, error_code(error)));
        }
        let result = body
            .pointer("/login/result")
            .and_then(Value::as_str)
            .unwrap_or("no result");
        if result != "Success" {
            let reason = body
                .pointer("/login/reason")
                .and_then(Value::as_str)
                .unwrap_or(result);
            return Err(AuthError::login_failed(&self.instance, reason));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(instance = %self.instance))]
    async fn login(&self, version: u64) -> Result<Credentials, AuthError> {
        let cookies = LoginCookies::new(self.api_base()?);
        if let LoginMethod::BotPassword { username, password } = &self.method {
            self.bot_password_login(username, password, &cookies)
                .await?;
            debug!(username = %username, "logged in");
        }

        let token = self.fetch_token("csrf", &cookies).await?;
        if token == ANONYMOUS_CSRF_TOKEN {
            return Err(AuthError::missing_token(
                &self.instance,
                "csrf",
                "session is not logged in",
            ));
        }

        info!(version, "obtained session credentials");
        Ok(Credentials::new(cookies.header_value(), token, version))
    }
}

fn error_code(error: &Value) -> String {
    error
        .get("code")
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string()
}

#[async_trait]
impl AuthProvider for SessionAuthProvider {
    async fn credentials(&self) -> Result<Credentials, AuthError> {
        let mut state = self.state.lock().await;
        if let Some(current) = &state.current {
            return Ok(current.clone());
        }
        let credentials = self.login(state.last_version + 1).await?;
        state.last_version = credentials.version();
        state.current = Some(credentials.clone());
        Ok(credentials)
    }

    async fn refresh(&self, stale: &Credentials) -> Result<(), AuthError> {
        let mut state = self.state.lock().await;
        if let Some(current) = &state.current
            && current.version() != stale.version()
        {
            debug!(
                stale = stale.version(),
                current = current.version(),
                "credentials already refreshed"
            );
            return Ok(());
        }
        state.current = None;
        let credentials = self.login(state.last_version + 1).await?;
        state.last_version = credentials.version();
        state.current = Some(credentials);
        Ok(())
    }
}
