//! Error types for the digest pipeline.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.
//! `ClientError` covers every upstream call (feed and LLM); `DigestError` covers the
//! batching, aggregation, cache and publishing stages.

use std::time::Duration;

/// Errors from the HTTP client layer (arXiv feed and LLM provider).
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Middleware error
    #[error("Middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    /// Endpoint URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Atom feed could not be decoded
    #[error("Failed to parse feed: {0}")]
    Feed(#[from] quick_xml::DeError),

    /// JSON parsing error
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Rate limited by the upstream API (429 response)
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Suggested wait time before retry
        retry_after: Duration,
    },

    /// Invalid request parameters (400 response)
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message from API
        message: String,
    },

    /// Missing or rejected credentials (401/403 response)
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Error message from API
        message: String,
    },

    /// No response within the configured request timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Server error (5xx response)
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Unexpected HTTP status
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },

    /// The LLM answered without any completion text
    #[error("Completion response contained no choices")]
    EmptyCompletion,
}

impl ClientError {
    /// Create a rate limited error with retry-after duration.
    #[must_use]
    pub fn rate_limited(seconds: u64) -> Self {
        Self::RateLimited {
            retry_after: Duration::from_secs(seconds),
        }
    }

    /// Create a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Create an unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Create a server error.
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Timeout(_) | Self::Server { .. }
        )
    }

    /// Get the retry-after duration if this is a rate limit error.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

/// Errors from the digest stages (batching, aggregation, caching, publishing).
#[derive(thiserror::Error, Debug)]
pub enum DigestError {
    /// Empty or malformed input handed to a stage
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Field or collection that failed validation
        field: String,
        /// Validation error message
        message: String,
    },

    /// Feed or LLM call failure that could not be recovered locally
    #[error("Upstream error: {0}")]
    Upstream(#[from] ClientError),

    /// Filesystem error (paper cache, blog posts)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DigestError {
    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Convert to a message suitable for the operator's terminal.
    #[must_use]
    pub fn to_user_message(&self) -> String {
        match self {
            Self::Upstream(ClientError::RateLimited { retry_after }) => {
                format!("Rate limited by upstream API, retry in {retry_after:?}.")
            }
            Self::Upstream(ClientError::Unauthorized { .. }) => {
                "The LLM provider rejected the API key. Check OPENAI_API_KEY.".to_string()
            }
            Self::InvalidInput { field, message } => {
                format!("Invalid input for '{field}': {message}")
            }
            _ => self.to_string(),
        }
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for digest operations.
pub type DigestResult<T> = Result<T, DigestError>;
