//! The research pipeline: plan → execute → summarize.
//!
//! Steps communicate only through [`PipelineState`], a monotonic key/value
//! map: each step reads what its predecessors wrote and adds its own keys.
//! The conversation memory is an explicit handle owned by the caller, so
//! concurrent pipeline runs (one per session) stay independent.

mod execute;
mod plan;
mod summarize;

pub use execute::ExecuteStep;
pub use plan::{FALLBACK_REASONING, PlanDecision, PlanParseError, PlanStep};
pub use summarize::SummarizeStep;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;
use crate::memory::ConversationMemory;
use crate::providers::SharedModel;
use crate::tool::{ToolCatalog, ToolInvoker};

/// State keys written by the research pipeline.
pub mod keys {
    /// The user's query, written at pipeline start.
    pub const QUERY: &str = "query";
    /// The plan decision, written by the planning step.
    pub const PLAN: &str = "plan";
    /// Tool output (or pass-through reasoning), written by the execute step.
    pub const TOOL_RESULT: &str = "tool_result";
    /// The trimmed final answer, written by the summarize step.
    pub const FINAL_ANSWER: &str = "final_answer";
}

/// Monotonic key/value state threaded through pipeline steps.
///
/// Keys accumulate as the pipeline advances. The first write to a key wins;
/// a repeated write is ignored and logged, and nothing ever removes a key.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineState {
    values: BTreeMap<String, Value>,
}

impl PipelineState {
    /// Create an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Read a value as a string slice.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Whether a key has been written.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of keys written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing has been written yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Write a key. The first write wins; repeated writes are dropped.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        if self.values.contains_key(&key) {
            warn!(key, "ignoring repeated write to pipeline state");
            return;
        }
        self.values.insert(key, value);
    }
}

/// Fixed linear composition of the three research steps.
#[derive(Debug, Clone)]
pub struct ResearchPipeline {
    plan: PlanStep,
    execute: ExecuteStep,
    summarize: SummarizeStep,
}

impl ResearchPipeline {
    /// Create a pipeline with a tool host behind the execute step.
    #[must_use]
    pub fn new(model: SharedModel, catalog: ToolCatalog, invoker: ToolInvoker) -> Self {
        Self {
            plan: PlanStep::new(Arc::clone(&model), catalog),
            execute: ExecuteStep::new(invoker),
            summarize: SummarizeStep::new(model),
        }
    }

    /// Create a pipeline with no tool host; only the no-tool path can
    /// produce grounding context.
    #[must_use]
    pub fn without_tools(model: SharedModel, catalog: ToolCatalog) -> Self {
        Self {
            plan: PlanStep::new(Arc::clone(&model), catalog),
            execute: ExecuteStep::without_invoker(),
            summarize: SummarizeStep::new(model),
        }
    }

    /// Run the pipeline for one query.
    ///
    /// Returns the accumulated state; the final answer sits under
    /// [`keys::FINAL_ANSWER`], already trimmed. Tool and plan-parse failures
    /// degrade inside their steps; only configuration and chat-call failures
    /// surface as errors.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Llm`](crate::Error::Llm) when a chat call fails.
    pub async fn run(
        &self,
        query: &str,
        memory: &mut ConversationMemory,
    ) -> Result<PipelineState> {
        let mut state = PipelineState::new();
        state.insert(keys::QUERY, Value::String(query.to_string()));

        debug!(query, "step 1: planning");
        let decision = self.plan.run(query, memory).await?;
        state.insert(keys::PLAN, decision.to_value());

        debug!("step 2: tool execution");
        let tool_result = self.execute.run(&decision).await;
        state.insert(keys::TOOL_RESULT, tool_result.clone());

        debug!("step 3: summarization");
        let context = context_text(&tool_result);
        let answer = self
            .summarize
            .run(query, context.as_deref(), memory)
            .await?;
        state.insert(keys::FINAL_ANSWER, Value::String(answer.trim().to_string()));

        Ok(state)
    }
}

/// Render a tool result value as grounding text, if it has any substance.
fn context_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    if text.trim().is_empty() { None } else { Some(text) }
}
