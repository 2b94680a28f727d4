//! Unified error types for the magpie crate.
//!
//! Module-specific errors ([`LlmError`](crate::providers::LlmError),
//! [`ToolError`](crate::tool::ToolError),
//! [`ApprovalError`](crate::approval::ApprovalError)) convert into the main
//! [`Error`] type via `#[from]`. Only configuration failures are raised
//! before any I/O; tool and parse failures are absorbed inside the pipeline
//! steps and never surface here.

/// Result type alias for magpie operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the magpie crate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Missing or invalid configuration.
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    /// LLM provider error.
    #[error("llm: {0}")]
    Llm(#[from] crate::providers::LlmError),

    /// Tool invocation error.
    #[error("tool: {0}")]
    Tool(#[from] crate::tool::ToolError),

    /// Approval state machine error.
    #[error("approval: {0}")]
    Approval(#[from] crate::approval::ApprovalError),

    /// JSON serialization/deserialization error.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Error type for configuration loading.
///
/// Raised before any network call is made; a missing required value aborts
/// the whole run.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("missing required configuration: {0}")]
    Missing(String),

    /// A configuration value is present but unusable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Create a missing-variable error.
    #[must_use]
    pub fn missing(var: impl Into<String>) -> Self {
        Self::Missing(var.into())
    }

    /// Create an invalid-value error.
    #[must_use]
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}
