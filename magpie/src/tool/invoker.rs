//! Remote tool invocation over the tool-host wire contract.
//!
//! A request is `POST {"tool": <name>, "args": <mapping>}`. The host replies
//! either with a single body (blocking transport) or with an event stream
//! whose `tool_result` events carry payload chunks and whose `done` event
//! terminates the call. Which transport to use is configuration, not code:
//! the same invoker serves both, so the pipeline steps are written once.

use eventsource_stream::Eventsource;
use futures::StreamExt;
use serde_json::{Map, Value, json};
use tracing::{debug, trace};

use super::ToolError;
use crate::config::Config;
use crate::error::ConfigError;

/// Event name carrying a payload chunk.
const EVENT_TOOL_RESULT: &str = "tool_result";
/// Terminal event name.
const EVENT_DONE: &str = "done";

/// Transport strategy for reaching the tool host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolTransport {
    /// Single blocking request/response call.
    Blocking,
    /// Event-stream response, consumed until the terminal event.
    #[default]
    EventStream,
}

/// Result of a tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// Structured value parsed from a list-like textual response.
    Structured(Value),
    /// Opaque text returned by the host.
    Text(String),
}

impl ToolOutput {
    /// Whether the output carries nothing usable as grounding context.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Structured(value) => value.is_null(),
            Self::Text(text) => text.trim().is_empty(),
        }
    }

    /// Convert into a JSON value for pipeline state.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Structured(value) => value,
            Self::Text(text) => Value::String(text),
        }
    }
}

/// Client for a remote tool host.
#[derive(Debug, Clone)]
pub struct ToolInvoker {
    client: reqwest::Client,
    endpoint: String,
    transport: ToolTransport,
}

impl ToolInvoker {
    /// Create an invoker for an explicit endpoint.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, transport: ToolTransport) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            transport,
        }
    }

    /// Create an invoker from [`Config`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when no tool-host endpoint is
    /// configured. This is checked here, before any network call.
    pub fn from_config(config: &Config, transport: ToolTransport) -> Result<Self, ConfigError> {
        let endpoint = config.require_tool_host()?;
        Ok(Self::new(endpoint, transport))
    }

    /// The configured transport strategy.
    #[must_use]
    pub fn transport(&self) -> ToolTransport {
        self.transport
    }

    /// Invoke a named tool with the given arguments.
    ///
    /// # Errors
    ///
    /// [`ToolError::Transport`] on a non-success connection status,
    /// [`ToolError::Connection`] on request or stream failure, and
    /// [`ToolError::Parse`] when a list-like response body is not valid
    /// JSON. Callers are expected to absorb these rather than letting them
    /// end the pipeline.
    pub async fn invoke(
        &self,
        tool_name: &str,
        args: &Map<String, Value>,
    ) -> Result<ToolOutput, ToolError> {
        debug!(tool = tool_name, transport = ?self.transport, "invoking tool");
        let payload = json!({ "tool": tool_name, "args": args });

        let raw = match self.transport {
            ToolTransport::Blocking => self.invoke_blocking(&payload).await?,
            ToolTransport::EventStream => self.invoke_event_stream(&payload).await?,
        };

        parse_result(&raw)
    }

    /// Single request/response round trip.
    async fn invoke_blocking(&self, payload: &Value) -> Result<String, ToolError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::transport(status.as_u16(), body));
        }

        Ok(response.text().await?.trim().to_string())
    }

    /// Consume an event stream until the terminal event, concatenating the
    /// payloads of `tool_result` events in arrival order.
    async fn invoke_event_stream(&self, payload: &Value) -> Result<String, ToolError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::transport(status.as_u16(), body));
        }

        let mut events = response.bytes_stream().eventsource();
        let mut collected: Vec<String> = Vec::new();

        while let Some(event) = events.next().await {
            let event = event.map_err(|e| ToolError::connection(e.to_string()))?;
            match event.event.as_str() {
                EVENT_TOOL_RESULT => collected.push(event.data),
                EVENT_DONE => break,
                other => trace!(event = other, "ignoring event"),
            }
        }

        Ok(collected.join("\n").trim().to_string())
    }
}

/// Apply the result parsing policy: a list-like body is structured data,
/// anything else is opaque text.
fn parse_result(raw: &str) -> Result<ToolOutput, ToolError> {
    if raw.starts_with('[') {
        let value: Value = serde_json::from_str(raw)?;
        Ok(ToolOutput::Structured(value))
    } else {
        Ok(ToolOutput::Text(raw.to_string()))
    }
}
