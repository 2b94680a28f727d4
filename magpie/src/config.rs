//! Environment-driven configuration.
//!
//! All external addresses and credentials come from `MAGPIE_*` environment
//! variables. Required values are checked when the consuming component is
//! constructed, before any network call; a missing value fails the run with
//! [`ConfigError::Missing`].

use crate::error::ConfigError;

/// Environment variable holding the chat-endpoint API key.
pub const ENV_LLM_API_KEY: &str = "MAGPIE_LLM_API_KEY";
/// Environment variable overriding the chat-endpoint base URL.
pub const ENV_LLM_BASE_URL: &str = "MAGPIE_LLM_BASE_URL";
/// Environment variable overriding the model identifier.
pub const ENV_LLM_MODEL: &str = "MAGPIE_LLM_MODEL";
/// Environment variable holding the tool-host endpoint URL.
pub const ENV_TOOL_HOST: &str = "MAGPIE_TOOL_HOST";
/// Environment variable naming the approver stamped on tickets.
pub const ENV_APPROVER: &str = "MAGPIE_APPROVER";

const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
const DEFAULT_APPROVER: &str = "on-call approver";

/// Runtime configuration for pipelines and their collaborators.
///
/// `tool_host_url` is optional here because the research pipeline can run
/// tool-less; [`ToolInvoker`](crate::tool::ToolInvoker) construction is the
/// point where its absence becomes a hard error.
#[derive(Debug, Clone)]
pub struct Config {
    /// API key for the chat endpoint.
    pub llm_api_key: Option<String>,
    /// Base URL of the OpenAI-compatible chat endpoint.
    pub llm_base_url: String,
    /// Model identifier sent with each chat request.
    pub llm_model: String,
    /// Endpoint URL of the remote tool host.
    pub tool_host_url: Option<String>,
    /// Identity of the human approver for reimbursement tickets.
    pub approver: String,
}

impl Config {
    /// Load configuration from `MAGPIE_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            llm_api_key: read(ENV_LLM_API_KEY),
            llm_base_url: read(ENV_LLM_BASE_URL)
                .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
            llm_model: read(ENV_LLM_MODEL).unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            tool_host_url: read(ENV_TOOL_HOST),
            approver: read(ENV_APPROVER).unwrap_or_else(|| DEFAULT_APPROVER.to_string()),
        }
    }

    /// The chat API key, or an error naming the missing variable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when the key is not configured.
    pub fn require_llm_api_key(&self) -> Result<&str, ConfigError> {
        self.llm_api_key
            .as_deref()
            .ok_or_else(|| ConfigError::missing(ENV_LLM_API_KEY))
    }

    /// The tool-host endpoint, or an error naming the missing variable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when no endpoint is configured.
    pub fn require_tool_host(&self) -> Result<&str, ConfigError> {
        self.tool_host_url
            .as_deref()
            .ok_or_else(|| ConfigError::missing(ENV_TOOL_HOST))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: None,
            llm_base_url: DEFAULT_LLM_BASE_URL.to_string(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            tool_host_url: None,
            approver: DEFAULT_APPROVER.to_string(),
        }
    }
}

/// Read an environment variable, treating empty values as unset.
fn read(var: &str) -> Option<String> {
    match std::env::var(var) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}
