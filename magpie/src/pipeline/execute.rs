//! Execution step: dispatch the planned tool call, or skip it.

use serde_json::Value;
use tracing::{debug, warn};

use super::plan::PlanDecision;
use crate::tool::{ToolError, ToolInvoker};

/// Reasoning substitute when the plan skipped tools without saying why.
const NO_TOOL_REASONING: &str = "Tool use not required.";

/// The execution step.
///
/// Infallible by design: a missing tool name, a transport failure, or a
/// malformed structured result all come back as an inline
/// `[Tool Error]` string so the pipeline always reaches summarization.
#[derive(Debug, Clone, Default)]
pub struct ExecuteStep {
    invoker: Option<ToolInvoker>,
}

impl ExecuteStep {
    /// Create an execution step backed by a tool invoker.
    #[must_use]
    pub fn new(invoker: ToolInvoker) -> Self {
        Self {
            invoker: Some(invoker),
        }
    }

    /// Create an execution step with no tool host.
    ///
    /// The no-tool path works normally; a plan that requests a tool anyway
    /// degrades to an inline error string.
    #[must_use]
    pub fn without_invoker() -> Self {
        Self { invoker: None }
    }

    /// Carry out the plan.
    ///
    /// Returns the reasoning text verbatim when no tool is requested,
    /// otherwise the tool's output (or the inline error string).
    pub async fn run(&self, decision: &PlanDecision) -> Value {
        if !decision.use_tool {
            let reasoning = if decision.reasoning.is_empty() {
                NO_TOOL_REASONING
            } else {
                decision.reasoning.as_str()
            };
            debug!("no tool requested, passing reasoning through");
            return Value::String(reasoning.to_string());
        }

        let Some(tool_name) = decision.tool_name.as_deref() else {
            return tool_error(&ToolError::MissingName);
        };
        let Some(invoker) = &self.invoker else {
            warn!(tool = tool_name, "tool requested but no tool host is configured");
            return Value::String("[Tool Error] no tool host is configured".to_string());
        };

        match invoker.invoke(tool_name, &decision.tool_args).await {
            Ok(output) => output.into_value(),
            Err(e) => tool_error(&e),
        }
    }
}

/// Render a tool failure as the inline error marker.
fn tool_error(err: &ToolError) -> Value {
    warn!(error = %err, "tool invocation failed");
    Value::String(format!("[Tool Error] {err}"))
}
