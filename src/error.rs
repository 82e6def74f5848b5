//! Error taxonomy for backend calls.
//!
//! DESIGN
//! ======
//! Every HTTP failure is classified by status at the point it is observed, so
//! the interceptor can branch on `Unauthorized`/`Forbidden` without parsing
//! status codes again. The enum is `Clone` because a single refresh outcome
//! is shared by every request waiting on it.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use serde::Deserialize;

pub const FALLBACK_MESSAGE: &str = "Something went wrong. Try again later";

// =============================================================================
// API ERROR
// =============================================================================

/// Errors produced by calls against the booking backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, connect, timeout, reset).
    #[error("network failure: {0}")]
    Network(String),

    /// The backend answered 401.
    #[error("unauthorized: {path}")]
    Unauthorized { path: String, body: String },

    /// The backend answered 403.
    #[error("forbidden: {path}")]
    Forbidden { path: String, body: String },

    /// Any other non-success status (validation failures, server errors).
    #[error("request to {path} failed with status {status}")]
    Status { status: u16, path: String, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// The request body or query could not be serialized.
    #[error("request encode failed: {0}")]
    Encode(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

#[derive(Deserialize)]
struct MessageBody {
    message: Option<String>,
}

impl ApiError {
    /// Classify a non-success status into the matching variant.
    #[must_use]
    pub fn from_status(status: u16, path: &str, body: String) -> Self {
        let path = path.to_owned();
        match status {
            401 => Self::Unauthorized { path, body },
            403 => Self::Forbidden { path, body },
            _ => Self::Status { status, path, body },
        }
    }

    /// HTTP status carried by this error, if the backend responded at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    #[must_use]
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden { .. })
    }

    /// Message suitable for showing to the user.
    ///
    /// Prefers the backend's `message` field when the body is the usual JSON
    /// envelope; otherwise falls back to a generic sentence.
    #[must_use]
    pub fn user_message(&self) -> String {
        let body = match self {
            Self::Unauthorized { body, .. } | Self::Forbidden { body, .. } | Self::Status { body, .. } => body,
            Self::Network(_) => return "Could not reach the server. Check your connection".to_owned(),
            _ => return FALLBACK_MESSAGE.to_owned(),
        };
        serde_json::from_str::<MessageBody>(body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_MESSAGE.to_owned())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if err.is_builder() {
            Self::ClientBuild(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
