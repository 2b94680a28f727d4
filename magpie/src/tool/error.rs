//! Error types for tool invocation.

/// Error type for tool invocation.
///
/// None of these abort a pipeline run: the execute step converts every
/// variant into an inline `[Tool Error]` string so the summarizer always
/// runs.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ToolError {
    /// The tool host answered with a non-success status on connection.
    #[error("tool host connection failed: {status} - {body}")]
    Transport {
        /// Status code returned by the host.
        status: u16,
        /// Response body, as returned.
        body: String,
    },

    /// The connection or stream failed below the HTTP layer.
    #[error("connection: {0}")]
    Connection(String),

    /// A list-like response body failed to parse as JSON.
    #[error("malformed structured result: {0}")]
    Parse(#[from] serde_json::Error),

    /// The plan asked for a tool but named none.
    #[error("plan requested tool use without a tool name")]
    MissingName,
}

impl ToolError {
    /// Create a transport error from a status and body.
    #[must_use]
    pub fn transport(status: u16, body: impl Into<String>) -> Self {
        Self::Transport {
            status,
            body: body.into(),
        }
    }

    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }
}

impl From<reqwest::Error> for ToolError {
    fn from(err: reqwest::Error) -> Self {
        Self::connection(err.to_string())
    }
}
