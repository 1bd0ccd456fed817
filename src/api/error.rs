//! Client-side API error type.

use serde::Deserialize;

/// Message shown when the backend could not be reached.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please try again.";

/// Failure of a backend call, displayable to the user as-is.
#[derive(Debug)]
pub enum ApiError {
    /// The backend answered with a non-success status
    Rejected { status: u16, message: String },
    /// No response was received
    Network,
    /// A response arrived but its body could not be decoded
    InvalidResponse(String),
    /// An endpoint path could not be joined to the base URL
    InvalidUrl(url::ParseError),
}

impl ApiError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// HTTP status for rejections.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Replace the message of a rejection with the first rule whose needle
    /// it contains. Other variants pass through unchanged.
    pub fn refine(self, rules: &[(&str, &str)]) -> Self {
        match self {
            ApiError::Rejected { status, message } => {
                let message = rules
                    .iter()
                    .find(|(needle, _)| message.contains(needle))
                    .map(|(_, friendly)| friendly.to_string())
                    .unwrap_or(message);
                ApiError::Rejected { status, message }
            }
            other => other,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Rejected { message, .. } => f.write_str(message),
            ApiError::Network => f.write_str(NETWORK_ERROR_MESSAGE),
            ApiError::InvalidResponse(e) => write!(f, "Unexpected response from server: {}", e),
            ApiError::InvalidUrl(e) => write!(f, "Invalid endpoint URL: {}", e),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::InvalidUrl(e) => Some(e),
            _ => None,
        }
    }
}

/// Error body sent by the backend.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// Backend message from a raw error body, if it carries one.
pub(crate) fn backend_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|m| !m.is_empty())
}
