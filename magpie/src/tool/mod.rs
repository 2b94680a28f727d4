//! Remote tool definitions and invocation.
//!
//! Tools live on a remote host and are called by name through the
//! [`ToolInvoker`]; locally the crate only knows their names and
//! descriptions via the [`ToolCatalog`], which the planner uses to decide
//! what may be called.

mod error;
mod invoker;

pub use error::ToolError;
pub use invoker::{ToolInvoker, ToolOutput, ToolTransport};

use serde::{Deserialize, Serialize};

/// Name and description of a remotely callable tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name as dispatched on the wire.
    pub name: String,
    /// One-line description shown to the planner.
    pub description: String,
}

impl ToolDefinition {
    /// Create a definition.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// The registry of tools the planner is allowed to pick from.
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    tools: Vec<ToolDefinition>,
}

impl ToolCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in research catalog: web search, URL fetch, email.
    #[must_use]
    pub fn research_tools() -> Self {
        let mut catalog = Self::new();
        catalog.add(ToolDefinition::new(
            "web_search",
            "Search the web for up-to-date information, books, or articles related to the input query.",
        ));
        catalog.add(ToolDefinition::new(
            "fetch_url_content",
            "Fetch and return the content of a URL, especially useful for extracting article or book details.",
        ));
        catalog.add(ToolDefinition::new(
            "send_email",
            "Send an email to a recipient from sender email with body and subject.",
        ));
        catalog
    }

    /// Add a definition to the catalog.
    pub fn add(&mut self, tool: ToolDefinition) {
        self.tools.push(tool);
    }

    /// Whether a tool with this name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.name == name)
    }

    /// All registered definitions.
    #[must_use]
    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    /// Render the catalog as `- name: description` lines for a prompt.
    #[must_use]
    pub fn describe(&self) -> String {
        self.tools
            .iter()
            .map(|t| format!("- {}: {}", t.name, t.description))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn research_catalog_has_the_three_builtins() {
        let catalog = ToolCatalog::research_tools();
        assert!(catalog.contains("web_search"));
        assert!(catalog.contains("fetch_url_content"));
        assert!(catalog.contains("send_email"));
        assert!(!catalog.contains("shell"));
    }

    #[test]
    fn describe_lists_one_tool_per_line() {
        let catalog = ToolCatalog::research_tools();
        let text = catalog.describe();
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("- web_search: "));
    }
}
