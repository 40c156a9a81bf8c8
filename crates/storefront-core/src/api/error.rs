use serde::Deserialize;
use thiserror::Error;

/// Failures surfaced to callers of the session manager and API client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Cannot reach server: {0}")]
    NetworkUnreachable(String),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Session expired - please log in again")]
    SessionExpired,

    #[error("Unauthorized - request rejected after token refresh")]
    Unauthorized,

    #[error("Request failed with status {status}: {message}")]
    RequestFailed { status: u16, message: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Credential storage error: {0}")]
    Storage(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Laravel-style error body: `{"message": "...", "errors": {"field": ["..."]}}`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    #[serde(default)]
    errors: Option<serde_json::Map<String, serde_json::Value>>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Build a pass-through failure for a non-success status.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = server_message(body).unwrap_or_else(|| Self::truncate_body(body));
        ApiError::RequestFailed { status, message }
    }

    /// Whether this failure ends the session and requires a fresh login.
    pub fn is_session_ending(&self) -> bool {
        matches!(self, ApiError::SessionExpired | ApiError::Unauthorized)
    }

    /// HTTP status of a server rejection, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Extract the human-readable reason from an error body.
///
/// Validation failures (422) carry per-field messages; the first one wins.
/// Otherwise the top-level `message` is used.
pub fn server_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;

    let first_validation_error = parsed.errors.as_ref().and_then(|errors| {
        errors.values().find_map(|value| match value {
            serde_json::Value::Array(items) => items.iter().find_map(|i| i.as_str().map(String::from)),
            serde_json::Value::String(s) => Some(s.clone()),
            _ => None,
        })
    });

    first_validation_error
        .or(parsed.message)
        .filter(|m| !m.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_uses_server_message() {
        let err = ApiError::from_status(404, r#"{"message": "Product not found"}"#);
        assert_eq!(
            err,
            ApiError::RequestFailed {
                status: 404,
                message: "Product not found".to_string()
            }
        );
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_from_status_falls_back_to_body() {
        let err = ApiError::from_status(502, "Bad Gateway");
        assert_eq!(err.to_string(), "Request failed with status 502: Bad Gateway");
    }

    #[test]
    fn test_from_status_truncates_long_bodies() {
        let body = "x".repeat(2000);
        match ApiError::from_status(500, &body) {
            ApiError::RequestFailed { message, .. } => {
                assert!(message.starts_with(&"x".repeat(500)));
                assert!(message.contains("truncated, 2000 total bytes"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_server_message_prefers_validation_errors() {
        let body = r#"{"message": "The given data was invalid.", "errors": {"email": ["The email has already been taken."]}}"#;
        assert_eq!(
            server_message(body).as_deref(),
            Some("The email has already been taken.")
        );
    }

    #[test]
    fn test_server_message_missing() {
        assert_eq!(server_message("not json"), None);
        assert_eq!(server_message(r#"{"message": "  "}"#), None);
        assert_eq!(server_message(r#"{"other": 1}"#), None);
    }

    #[test]
    fn test_session_ending() {
        assert!(ApiError::SessionExpired.is_session_ending());
        assert!(ApiError::Unauthorized.is_session_ending());
        assert!(!ApiError::NetworkUnreachable("down".into()).is_session_ending());
    }
}
