//! Default User-Agent for API traffic.
//!
//! Wikimedia's User-Agent policy asks clients to identify themselves; callers
//! running bots should override this with their own contact details.

/// Default User-Agent sent when the config does not set one.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("wikibase-edit/{version} (rust; claim-writer)")
}
