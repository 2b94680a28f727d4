//! Error types for model providers.

/// Error type for chat-model calls.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LlmError {
    /// The endpoint answered with a non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// Status code returned by the endpoint.
        status: u16,
        /// Response body, as returned.
        body: String,
    },

    /// Network or connection failure.
    #[error("network: {0}")]
    Network(String),

    /// The response body did not have the expected shape.
    #[error("response format: {0}")]
    ResponseFormat(String),
}

impl LlmError {
    /// Create an HTTP status error.
    #[must_use]
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Create a response format error.
    #[must_use]
    pub fn response_format(message: impl Into<String>) -> Self {
        Self::ResponseFormat(message.into())
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network("request timed out")
        } else if err.is_connect() {
            Self::network(format!("connection failed: {err}"))
        } else {
            Self::network(err.to_string())
        }
    }
}
