//! Planning step: ask the model whether a tool is needed, and which.

use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use crate::json_utils::{strip_code_fence, truthy};
use crate::memory::ConversationMemory;
use crate::message::ChatMessage;
use crate::providers::{LlmError, SharedModel};
use crate::tool::ToolCatalog;

/// Reasoning text of the fallback decision.
pub const FALLBACK_REASONING: &str = "Fallback: parsing failed.";

/// Structured output of the planning step.
///
/// Invariant: `use_tool == true` implies `tool_name` names a catalog tool;
/// [`PlanDecision::parse`] enforces this, falling back to the tool-less
/// decision otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanDecision {
    /// Whether a tool should be invoked.
    pub use_tool: bool,
    /// Name of the tool to invoke, when `use_tool` is set.
    pub tool_name: Option<String>,
    /// Arguments to pass to the tool.
    pub tool_args: Map<String, Value>,
    /// The model's reasoning for its choice.
    pub reasoning: String,
}

/// Why a model reply could not be turned into a [`PlanDecision`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PlanParseError {
    /// The reply was not valid JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The reply parsed, but not to an object.
    #[error("expected a JSON object, got {0}")]
    NotAnObject(String),

    /// Tool use was requested without a usable tool name.
    #[error("tool use requested without a tool name")]
    MissingToolName,

    /// The named tool is not in the catalog.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// `tool_args` was present but not an object.
    #[error("tool_args must be an object")]
    BadToolArgs,
}

impl PlanDecision {
    /// The safe decision used when the model's reply cannot be parsed:
    /// no tool, fixed reasoning text.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            use_tool: false,
            tool_name: None,
            tool_args: Map::new(),
            reasoning: FALLBACK_REASONING.to_string(),
        }
    }

    /// Parse and validate a raw model reply against the catalog.
    ///
    /// Strips a surrounding code fence, parses the JSON, and applies the
    /// boundary coercions in one place: `use_tools` accepts booleans and
    /// case-insensitive `"true"`/`"false"` strings; `tool_args` defaults to
    /// an empty object; a truthy `use_tools` requires a catalog tool name.
    ///
    /// # Errors
    ///
    /// Returns [`PlanParseError`] describing the first violation. Callers in
    /// the pipeline convert any error into [`PlanDecision::fallback`].
    pub fn parse(raw: &str, catalog: &ToolCatalog) -> Result<Self, PlanParseError> {
        let value: Value = serde_json::from_str(strip_code_fence(raw))?;
        let Some(object) = value.as_object() else {
            return Err(PlanParseError::NotAnObject(value.to_string()));
        };

        let use_tool = truthy(object.get("use_tools"));
        let reasoning = object
            .get("reasoning")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        if !use_tool {
            return Ok(Self {
                use_tool: false,
                tool_name: None,
                tool_args: Map::new(),
                reasoning,
            });
        }

        let tool_name = object
            .get("tool_name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or(PlanParseError::MissingToolName)?;
        if !catalog.contains(tool_name) {
            return Err(PlanParseError::UnknownTool(tool_name.to_string()));
        }

        let tool_args = match object.get("tool_args") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(_) => return Err(PlanParseError::BadToolArgs),
        };

        Ok(Self {
            use_tool: true,
            tool_name: Some(tool_name.to_string()),
            tool_args,
            reasoning,
        })
    }

    /// Render the decision as a JSON value for pipeline state.
    #[must_use]
    pub fn to_value(&self) -> Value {
        json!({
            "use_tools": self.use_tool,
            "tool_name": self.tool_name,
            "tool_args": self.tool_args,
            "reasoning": self.reasoning,
        })
    }
}

/// The planning step.
#[derive(Clone)]
pub struct PlanStep {
    model: SharedModel,
    catalog: ToolCatalog,
}

impl std::fmt::Debug for PlanStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanStep")
            .field("catalog", &self.catalog)
            .finish_non_exhaustive()
    }
}

impl PlanStep {
    /// Create a planning step over a model and a tool catalog.
    #[must_use]
    pub fn new(model: SharedModel, catalog: ToolCatalog) -> Self {
        Self { model, catalog }
    }

    /// Decide whether the query needs a tool.
    ///
    /// The `(query, raw reply)` turn is appended to memory unconditionally,
    /// including when parsing fails and the fallback decision is returned.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError`] only when the chat call itself fails; a reply
    /// that cannot be parsed degrades to [`PlanDecision::fallback`].
    pub async fn run(
        &self,
        query: &str,
        memory: &mut ConversationMemory,
    ) -> Result<PlanDecision, LlmError> {
        let mut messages = vec![ChatMessage::system(self.instruction())];
        messages.extend(memory.to_messages());
        messages.push(ChatMessage::user(query));

        let raw = self.model.generate(&messages).await?;

        let decision = match PlanDecision::parse(&raw, &self.catalog) {
            Ok(decision) => decision,
            Err(e) => {
                warn!(error = %e, "failed to parse plan, taking the tool-less path");
                PlanDecision::fallback()
            }
        };
        memory.append(query, &raw);

        debug!(use_tool = decision.use_tool, tool = ?decision.tool_name, "plan");
        Ok(decision)
    }

    /// Fixed planning instruction, with the catalog enumerated inline.
    fn instruction(&self) -> String {
        format!(
            "You are a research assistant. Given the user query, determine:\n\
             1. Whether tool use is required. If the question is factual and common \
             (e.g., 'What is the capital of France?'), no tools are needed.\n\
             2. If tools are needed, specify:\n\
             \x20  - The reasoning for using tools.\n\
             \x20  - The most appropriate tool from this list:\n\
             {}\n\n\
             Return ONLY valid JSON in this format (no explanation or prose, just the JSON object):\n\n\
             {{\n\
             \x20 \"use_tools\": true or false,\n\
             \x20 \"tool_name\": \"tool_name_if_applicable\",\n\
             \x20 \"tool_args\": {{ \"relevant\": \"arguments\" }},\n\
             \x20 \"reasoning\": \"Why you chose this tool and these args\"\n\
             }}",
            self.catalog.describe()
        )
    }
}
