use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Failed to discover {service}: {message}")]
    Discovery { service: String, message: String },

    #[error("Rate limit exceeded. Wait {wait_secs} seconds before next call")]
    RateLimitExceeded { wait_secs: u64 },

    #[error("Valid user token required. Call fetch_token first")]
    SessionRequired,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Request not found: {0}")]
    RequestNotFound(String),

    #[error("SOAP fault in {operation}: [{code}] {message}")]
    RemoteFault {
        operation: String,
        code: String,
        message: String,
    },

    #[error("Transport error in {operation}: {message}")]
    Transport { operation: String, message: String },

    #[error("Invalid response from {operation}: {message}")]
    InvalidResponse { operation: String, message: String },

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

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

    /// Error for a non-2xx reply that did not carry a SOAP fault.
    pub fn from_status(operation: &str, status: u16, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        let message = match status {
            401 | 403 => format!("Access denied (status {}): {}", status, truncated),
            404 => format!("Endpoint not found: {}", truncated),
            500..=599 => format!("Server error (status {}): {}", status, truncated),
            _ => format!("Status {}: {}", status, truncated),
        };
        ApiError::Transport {
            operation: operation.to_string(),
            message,
        }
    }

    pub fn invalid_response(operation: &str, message: impl Into<String>) -> Self {
        ApiError::InvalidResponse {
            operation: operation.to_string(),
            message: message.into(),
        }
    }

}
