use std::time::Duration;

use serde::Deserialize;

/// Errors from the backend client layer.
///
/// [`ApiError::is_transport`] separates "couldn't reach the server" from
/// "the server rejected the request", which the dashboard reports with
/// different messages.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No response was received (network, DNS, TLS, reset connection).
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// The call did not settle within its deadline.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The backend answered with a non-2xx status.
    #[error("Backend error ({status}): {}", message.as_deref().unwrap_or("<no message>"))]
    Application {
        status: u16,
        /// The `error` field of the JSON payload, when present.
        message: Option<String>,
    },

    /// A 2xx response whose body did not match the expected shape.
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// The upload source could not be read.
    #[error("Cannot read upload file: {0}")]
    File(#[from] std::io::Error),

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_) | ApiError::Timeout(_))
    }

    /// Backend-provided error message, if the failure carried one.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ApiError::Application { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Build an [`ApiError::Application`] from a status and raw body,
    /// extracting `{"error": "..."}` when the body has that shape.
    pub fn from_response_body(status: u16, body: &str) -> Self {
        #[derive(Deserialize)]
        struct ErrorBody {
            error: String,
        }

        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .map(|b| b.error);
        ApiError::Application { status, message }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            ApiError::Application {
                status: status.as_u16(),
                message: None,
            }
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}
