//! Model providers.
//!
//! The [`ChatModel`] trait is the seam between the pipeline steps and
//! whatever actually answers: the bundled [`OpenAiCompatModel`] speaks any
//! OpenAI-compatible `chat/completions` endpoint, and tests plug in scripted
//! in-process implementations.

mod error;
mod openai;

pub use error::LlmError;
pub use openai::OpenAiCompatModel;

use async_trait::async_trait;

use crate::message::ChatMessage;

/// Async trait for chat-style language models.
///
/// One call, one text reply. Pipelines treat the model as an external
/// service consumed through this contract; retry and model-selection policy
/// live with the implementation, not the steps.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generate a reply for the given messages.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError`] on transport failure, a non-success HTTP status,
    /// or a response body that does not carry a text reply.
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;
}

/// A shared, reference-counted model handle for use across steps.
pub type SharedModel = std::sync::Arc<dyn ChatModel>;
