//! API client error types

use thiserror::Error;

/// Errors that can occur when talking to the budget API
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Budget API unavailable")]
    Unavailable,

    #[error("Request timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// 401 or 403: missing, expired or rejected token
    #[error("Not authorized: {message}")]
    Unauthorized { message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// Map a transport-level reqwest failure onto the error taxonomy
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_connect() {
            ApiError::Unavailable
        } else {
            ApiError::Request(err)
        }
    }

    /// Build the error for a non-success status and its response body
    pub(crate) fn from_status(status: u16, path: &str, body: &str) -> Self {
        let message = extract_error_message(body).unwrap_or_else(|| {
            reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("Unknown error")
                .to_string()
        });

        match status {
            401 | 403 => ApiError::Unauthorized { message },
            404 => ApiError::NotFound(path.to_string()),
            _ => ApiError::Status { status, message },
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}

/// Pull a human-readable message out of an error body
///
/// Understands `{"error": ...}`, `{"detail": ...}` and per-field validation
/// maps such as `{"password": ["too short"]}`. Falls back to the raw body.
fn extract_error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) => return Some(body.to_string()),
    };

    let object = match value.as_object() {
        Some(o) => o,
        None => return Some(body.to_string()),
    };

    for key in ["error", "detail", "message"] {
        if let Some(msg) = object.get(key).and_then(|v| v.as_str()) {
            return Some(msg.to_string());
        }
    }

    let mut parts = Vec::new();
    for (field, errors) in object {
        let text = match errors {
            serde_json::Value::Array(items) => items
                .iter()
                .filter_map(|i| i.as_str())
                .collect::<Vec<_>>()
                .join(" "),
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        parts.push(format!("{}: {}", field, text));
    }

    if parts.is_empty() {
        Some(body.to_string())
    } else {
        Some(parts.join("; "))
    }
}

/// Result type alias for API calls
pub type ApiResult<T> = Result<T, ApiError>;
