//! Authenticated write requests against the action API.
//!
//! # Architecture
//!
//! - [`ResilientPoster`] - POSTs with a single refresh-and-retry on auth failure
//! - [`AuthProvider`] - Owns session [`Credentials`]; [`SessionAuthProvider`] logs in
//! - [`HttpTransport`] - Sends one [`ApiRequest`]; [`ReqwestTransport`] is the default
//! - [`classify_response`] - Sorts API error bodies into auth and generic failures
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use wikibase_edit::request::{
//!     HttpTimeouts, LoginMethod, ReqwestTransport, RequestConfig, ResilientPoster,
//!     SessionAuthProvider,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RequestConfig::new("https://test.wikidata.org").with_summary("testing");
//! let auth = SessionAuthProvider::new(
//!     &config,
//!     LoginMethod::BotPassword {
//!         username: "Example@bot".to_string(),
//!         password: "generated-password".to_string(),
//!     },
//! )?;
//! let poster = ResilientPoster::new(
//!     Arc::new(ReqwestTransport::new(HttpTimeouts::default())?),
//!     Arc::new(auth),
//! );
//!
//! let params = vec![
//!     ("entity".to_string(), "Q4115189".to_string()),
//!     ("property".to_string(), "P17".to_string()),
//!     ("snaktype".to_string(), "novalue".to_string()),
//! ];
//! let body = poster.post("wbcreateclaim", &params, &config).await?;
//! println!("{body}");
//! # Ok(())
//! # }
//! ```

mod auth;
mod config;
mod error;
mod post;
mod session;
mod transport;

pub use auth::{AuthError, AuthProvider, Credentials};
pub use config::{
    ConfigError, DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT, HttpTimeouts, OAuthToken,
    RequestConfig,
};
pub use error::{RequestError, ResponseClass, classify_response, is_auth_error_code};
pub use post::{PostState, ResilientPoster, assemble_request};
pub use session::{LoginMethod, SessionAuthProvider};
pub use transport::{
    ApiRequest, FORM_CONTENT_TYPE, HttpTransport, ReqwestTransport, TransportError,
    build_http_client,
};
