//! Wikibase Edit Library
//!
//! Client-side write path for a Wikibase instance (e.g. Wikidata): encodes
//! user-supplied claim values into the snak format the action API expects,
//! and POSTs them with credentials that are refreshed once, transparently,
//! when the API reports an expired token or session.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`claim`] - Datatype encoders and the `wbcreateclaim` payload builder
//! - [`request`] - Resilient authenticated POST, auth providers, HTTP transport

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod claim;
pub mod request;
mod user_agent;

// Re-export commonly used types
pub use claim::{
    ClaimBuilder, ClaimError, ClaimInput, ClaimRequest, ClaimValue, Datatype, PropertyMetadata,
    PropertyTable, Snak, Snaktype, build_create_claim,
};
pub use request::{
    AuthProvider, Credentials, HttpTimeouts, HttpTransport, LoginMethod, OAuthToken, RequestConfig,
    RequestError, ReqwestTransport, ResilientPoster, SessionAuthProvider, TransportError,
};
