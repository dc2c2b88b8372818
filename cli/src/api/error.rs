use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned {status}{}", suffix(.detail))]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid response: {0}")]
    InvalidResponse(&'static str),

    #[error("cannot build request URL: {0}")]
    Url(String),
}

fn suffix(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default()
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

impl ApiError {
    /// Builds a status error, lifting a `{"detail": "..."}` message out of the
    /// body when there is one. Any other body shape is ignored.
    pub fn status(status: StatusCode, body: &[u8]) -> Self {
        let detail = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.detail)
            .and_then(|d| match d {
                serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
                _ => None,
            });
        ApiError::Status { status, detail }
    }

    #[cfg(test)]
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Text for the modal alert. Backend detail wins, a bare status error
    /// falls back to the caller's wording, anything else describes itself.
    pub fn alert_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Status {
                detail: Some(detail),
                ..
            } => detail.clone(),
            ApiError::Status { detail: None, .. } => fallback.to_string(),
            ApiError::Transport(e) if e.is_timeout() => {
                format!("{fallback}: the backend did not answer in time")
            }
            ApiError::Transport(_) => format!("{fallback}: cannot reach the backend"),
            ApiError::Decode(_) | ApiError::InvalidResponse(_) => {
                format!("{fallback}: unexpected response from the backend")
            }
            ApiError::Url(_) => format!("{fallback}: {self}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_up_string_detail() {
        let err = ApiError::status(StatusCode::BAD_REQUEST, br#"{"detail":"Insufficient balance"}"#);
        assert_eq!(err.detail(), Some("Insufficient balance"));
        assert_eq!(err.alert_message("Failed"), "Insufficient balance");
    }

    #[test]
    fn empty_body_falls_back() {
        let err = ApiError::status(StatusCode::UNAUTHORIZED, b"");
        assert_eq!(err.detail(), None);
        assert_eq!(err.alert_message("Invalid credentials"), "Invalid credentials");
    }

    #[test]
    fn structured_detail_is_ignored() {
        let body = br#"{"detail":[{"loc":["body","pin"],"msg":"field required"}]}"#;
        let err = ApiError::status(StatusCode::UNPROCESSABLE_ENTITY, body);
        assert_eq!(err.detail(), None);
        assert_eq!(err.alert_message("Failed to create"), "Failed to create");
    }

    #[test]
    fn display_includes_detail() {
        let err = ApiError::status(StatusCode::NOT_FOUND, br#"{"detail":"Customer not found"}"#);
        assert_eq!(err.to_string(), "backend returned 404 Not Found: Customer not found");
    }

    #[test]
    fn invalid_response_mentions_fallback() {
        let err = ApiError::InvalidResponse("empty session token");
        assert_eq!(
            err.alert_message("Unable to start session"),
            "Unable to start session: unexpected response from the backend"
        );
    }
}
