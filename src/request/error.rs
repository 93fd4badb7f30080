//! Request failures and the API error classifier.
//!
//! The action API answers most failures with HTTP 200 and a body of the form
//! `{"error": {"code": "...", "info": "..."}}`. [`classify_response`] sorts
//! such bodies into auth-class failures, which the poster recovers from once,
//! and everything else.

use serde_json::Value;
use thiserror::Error;

use super::auth::AuthError;
use super::config::ConfigError;
use super::transport::TransportError;

/// Substrings that mark an error code as auth-related, matched case-insensitively.
const AUTH_CODE_MARKERS: [&str; 2] = ["token", "auth"];

/// Assertion failures reported when the session behind the cookie has expired.
const SESSION_ASSERTION_CODES: [&str; 2] = ["assertuserfailed", "assertbotfailed"];

/// Terminal failure of a POST.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The API rejected the session or CSRF token, and the single retry did not help.
    #[error("[AUTH] {action} rejected credentials ({code}): {info}")]
    Auth {
        /// The API action requested.
        action: String,
        /// API error code, e.g. `badtoken`.
        code: String,
        /// Human-readable explanation from the API.
        info: String,
    },

    /// Any other structured API error.
    #[error("API error on {action} ({code}): {info}")]
    Api {
        /// The API action requested.
        action: String,
        /// API error code.
        code: String,
        /// Human-readable explanation from the API.
        info: String,
    },

    /// The request never produced a JSON body.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The auth provider could not supply credentials.
    #[error("could not obtain credentials for {action}: {source}")]
    Credentials {
        /// The API action requested.
        action: String,
        /// The provider's error.
        #[source]
        source: AuthError,
    },

    /// The request config is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl RequestError {
    /// Creates a credentials error.
    pub fn credentials(action: impl Into<String>, source: AuthError) -> Self {
        Self::Credentials {
            action: action.into(),
            source,
        }
    }

    /// Returns true for failures the poster may retry after a refresh.
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    /// API error code, when the failure came from an API error body.
    #[must_use]
    pub fn api_code(&self) -> Option<&str> {
        match self {
            Self::Auth { code, .. } | Self::Api { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// Outcome of inspecting a decoded API response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseClass {
    /// No error object: the body is the result.
    Success,
    /// Token or session failure.
    AuthFailure {
        code: String,
        info: String,
    },
    /// Any other API error.
    ApiFailure {
        code: String,
        info: String,
    },
}

impl ResponseClass {
    /// Converts a failure class into the matching [`RequestError`].
    /// Returns `None` for [`ResponseClass::Success`].
    #[must_use]
    pub fn into_error(self, action: &str) -> Option<RequestError> {
        match self {
            Self::Success => None,
            Self::AuthFailure { code, info } => Some(RequestError::Auth {
                action: action.to_string(),
                code,
                info,
            }),
            Self::ApiFailure { code, info } => Some(RequestError::Api {
                action: action.to_string(),
                code,
                info,
            }),
        }
    }
}

/// Returns true when an API error code denotes an expired or missing
/// session or token (`badtoken`, `notoken`, `assertuserfailed`...).
#[must_use]
pub fn is_auth_error_code(code: &str) -> bool {
    let code = code.to_ascii_lowercase();
    AUTH_CODE_MARKERS.iter().any(|marker| code.contains(marker))
        || SESSION_ASSERTION_CODES.contains(&code.as_str())
}

/// Classifies a decoded API response body.
///
/// Handles both the legacy `{"error": {...}}` format and the
/// `{"errors": [...]}` list returned with `errorformat` set.
#[must_use]
pub fn classify_response(body: &Value) -> ResponseClass {
    let error = match (body.get("error"), body.get("errors")) {
        (Some(error), _) => error,
        (None, Some(Value::Array(errors))) if !errors.is_empty() => &errors[0],
        _ => return ResponseClass::Success,
    };

    let code = error
        .get("code")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();
    let info = error
        .get("info")
        .or_else(|| error.get("text"))
        .and_then(Value::as_str)
        .map_or_else(|| error.to_string(), str::to_string);

    if is_auth_error_code(&code) {
        ResponseClass::AuthFailure { code, info }
    } else {
        ResponseClass::ApiFailure { code, info }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_auth_codes() {
        for code in [
            "badtoken",
            "notoken",
            "assertuserfailed",
            "assertbotfailed",
            "mwoauth-invalid-authorization",
            "BADTOKEN",
        ] {
            assert!(is_auth_error_code(code), "{code} should be auth-related");
        }
        for code in ["modification-failed", "no-such-entity", "ratelimited", ""] {
            assert!(!is_auth_error_code(code), "{code} should not be auth-related");
        }
    }

    #[test]
    fn test_success_body() {
        let body = json!({"success": 1, "claim": {"id": "Q1$abc"}});
        assert_eq!(classify_response(&body), ResponseClass::Success);
    }

    #[test]
    fn test_auth_failure_body() {
        let body = json!({"error": {"code": "badtoken", "info": "Invalid CSRF token."}});
        assert_eq!(
            classify_response(&body),
            ResponseClass::AuthFailure {
                code: "badtoken".to_string(),
                info: "Invalid CSRF token.".to_string()
            }
        );
    }

    #[test]
    fn test_api_failure_body() {
        let body = json!({
            "error": {"code": "no-such-entity", "info": "Could not find an entity with the ID \"Q0\"."}
        });
        let err = classify_response(&body).into_error("wbcreateclaim").unwrap();
        assert!(matches!(err, RequestError::Api { .. }));
        assert_eq!(err.api_code(), Some("no-such-entity"));
        assert!(err.to_string().contains("wbcreateclaim"));
    }

    #[test]
    fn test_errors_list_format() {
        let body = json!({
            "errors": [{"code": "notoken", "text": "The token parameter must be set."}]
        });
        assert!(matches!(
            classify_response(&body),
            ResponseClass::AuthFailure { .. }
        ));
    }

    #[test]
    fn test_error_without_code_is_generic() {
        let body = json!({"error": "boom"});
        let class = classify_response(&body);
        assert_eq!(
            class,
            ResponseClass::ApiFailure {
                code: "unknown".to_string(),
                info: "\"boom\"".to_string()
            }
        );
    }
}
