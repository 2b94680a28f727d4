//! Summarization step: produce the final structured answer.

use tracing::debug;

use crate::memory::ConversationMemory;
use crate::message::ChatMessage;
use crate::providers::{LlmError, SharedModel};

/// Fixed summarization instruction, including the exact output layout
/// expected by downstream consumers.
const INSTRUCTION: &str = "You are a helpful research assistant. Your task is to:\n\
1. Summarize the given topic.\n\
2. Recommend 2-3 relevant books (title and author).\n\
3. List 2-3 relevant online articles (title + URL).\n\
\n\
If tool output is provided, use it as context for summarizing the topic.\n\
\n\
Respond in the following Markdown format:\n\
\n\
**Summary:** <summary here>\n\
\n\
**Recommended Books:**\n\
- *Title* by Author\n\
- *Title* by Author\n\
\n\
**Relevant Articles:**\n\
- [Title](URL) - Optional short description\n";

/// The summarization step.
#[derive(Clone)]
pub struct SummarizeStep {
    model: SharedModel,
}

impl std::fmt::Debug for SummarizeStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummarizeStep").finish_non_exhaustive()
    }
}

impl SummarizeStep {
    /// Create a summarization step over a model.
    #[must_use]
    pub fn new(model: SharedModel) -> Self {
        Self { model }
    }

    /// Produce the final answer for `query`, grounded in `tool_result` when
    /// one is available.
    ///
    /// The `(query, reply)` turn is appended to memory. The reply is
    /// returned raw; callers trim it before presenting it.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError`] when the chat call fails.
    pub async fn run(
        &self,
        query: &str,
        tool_result: Option<&str>,
        memory: &mut ConversationMemory,
    ) -> Result<String, LlmError> {
        let mut messages = vec![ChatMessage::system(INSTRUCTION)];
        messages.extend(memory.to_messages());

        let user = match tool_result {
            Some(context) if !context.trim().is_empty() => {
                format!("Topic: {query}\n\nHere is some content from a tool:\n{context}")
            }
            _ => format!("Topic: {query}"),
        };
        messages.push(ChatMessage::user(user));

        debug!(grounded = tool_result.is_some(), "summarizing");
        let reply = self.model.generate(&messages).await?;
        memory.append(query, &reply);

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ChatModel;
    use async_trait::async_trait;
    use std::sync::Arc;

    /// Model that answers every call with the same well-formed summary and
    /// records the last user message it saw.
    #[derive(Debug, Default)]
    struct EchoingSummaryModel {
        last_user: std::sync::Mutex<String>,
    }

    const SUMMARY: &str = "**Summary:** A topic.\n\n\
        **Recommended Books:**\n- *Book* by Author\n\n\
        **Relevant Articles:**\n- [Article](https://example.com)";

    #[async_trait]
    impl ChatModel for EchoingSummaryModel {
        async fn generate(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
            let user = messages
                .last()
                .map(|m| m.content.clone())
                .unwrap_or_default();
            *self.last_user.lock().unwrap() = user;
            Ok(SUMMARY.to_string())
        }
    }

    #[tokio::test]
    async fn without_a_tool_result_the_prompt_is_just_the_topic() {
        let model = Arc::new(EchoingSummaryModel::default());
        let step = SummarizeStep::new(model.clone());
        let mut memory = ConversationMemory::new();

        let reply = step.run("rust agents", None, &mut memory).await.unwrap();
        assert!(reply.contains("**Summary:**"));
        assert_eq!(*model.last_user.lock().unwrap(), "Topic: rust agents");
    }

    #[tokio::test]
    async fn a_tool_result_is_included_as_grounding_context() {
        let model = Arc::new(EchoingSummaryModel::default());
        let step = SummarizeStep::new(model.clone());
        let mut memory = ConversationMemory::new();

        step.run("rust agents", Some("search said things"), &mut memory)
            .await
            .unwrap();
        let seen = model.last_user.lock().unwrap().clone();
        assert!(seen.starts_with("Topic: rust agents"));
        assert!(seen.contains("content from a tool"));
        assert!(seen.contains("search said things"));
    }

    #[tokio::test]
    async fn an_empty_tool_result_counts_as_absent() {
        let model = Arc::new(EchoingSummaryModel::default());
        let step = SummarizeStep::new(model.clone());
        let mut memory = ConversationMemory::new();

        step.run("rust agents", Some("   "), &mut memory).await.unwrap();
        assert_eq!(*model.last_user.lock().unwrap(), "Topic: rust agents");
    }

    #[tokio::test]
    async fn summarizing_twice_yields_two_well_formed_outputs_and_two_turns() {
        let model = Arc::new(EchoingSummaryModel::default());
        let step = SummarizeStep::new(model.clone());
        let mut memory = ConversationMemory::new();

        let first = step.run("topic", None, &mut memory).await.unwrap();
        let second = step.run("topic", None, &mut memory).await.unwrap();

        assert!(first.contains("**Summary:**"));
        assert!(second.contains("**Summary:**"));
        assert_eq!(memory.len(), 2);
        assert_eq!(memory.turns()[0].input, "topic");
        assert_eq!(memory.turns()[0].output, SUMMARY);
    }
}
