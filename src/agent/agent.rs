//! Core Agent struct.

use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use super::instructions::{DynamicInstructions, Instructions, StaticInstructions};
use crate::tools::tool::Tool;
use crate::types::ContextVariables;

const DEFAULT_NAME: &str = "Agent";
const DEFAULT_INSTRUCTIONS: &str = "You are a helpful agent.";

/// How the model may pick tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolChoice {
    Auto,
    None,
    Required,
    /// Force a call to the named tool.
    Function(String),
}

impl Serialize for ToolChoice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Auto => serializer.serialize_str("auto"),
            Self::None => serializer.serialize_str("none"),
            Self::Required => serializer.serialize_str("required"),
            Self::Function(name) => serde_json::json!({
                "type": "function",
                "function": { "name": name },
            })
            .serialize(serializer),
        }
    }
}

/// A named configuration bundling model target, instructions and tools.
///
/// Agents are built once and then shared as `Arc<Agent>`; a handoff swaps
/// which agent is active, it never edits one.
#[derive(Clone)]
pub struct Agent {
    name: String,
    model: Option<String>,
    instructions: Arc<dyn Instructions>,
    tools: Vec<Arc<dyn Tool>>,
    tool_choice: Option<ToolChoice>,
    parallel_tool_calls: bool,
}

impl Default for Agent {
    fn default() -> Self {
        Self::new(DEFAULT_NAME)
    }
}

impl Agent {
    /// Create a new agent with default instructions and no tools.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: None,
            instructions: Arc::new(StaticInstructions(DEFAULT_INSTRUCTIONS.to_string())),
            tools: Vec::new(),
            tool_choice: None,
            parallel_tool_calls: true,
        }
    }

    /// Set the model; when unset the run falls back to the configured default.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set literal instructions.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Arc::new(StaticInstructions(instructions.into()));
        self
    }

    /// Compute instructions from the run's context at request time.
    pub fn with_dynamic_instructions<F>(mut self, instructions: F) -> Self
    where
        F: Fn(&ContextVariables) -> String + Send + Sync + 'static,
    {
        self.instructions = Arc::new(DynamicInstructions(instructions));
        self
    }

    /// Use a custom instructions provider.
    pub fn with_instructions_provider(mut self, instructions: Arc<dyn Instructions>) -> Self {
        self.instructions = instructions;
        self
    }

    /// Add a tool.
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    /// Replace the tool list.
    pub fn with_tools(mut self, tools: Vec<Arc<dyn Tool>>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_tool_choice(mut self, tool_choice: ToolChoice) -> Self {
        self.tool_choice = Some(tool_choice);
        self
    }

    pub fn with_parallel_tool_calls(mut self, enabled: bool) -> Self {
        self.parallel_tool_calls = enabled;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    pub fn tool_choice(&self) -> Option<&ToolChoice> {
        self.tool_choice.as_ref()
    }

    pub fn parallel_tool_calls(&self) -> bool {
        self.parallel_tool_calls
    }

    /// Instructions for the given context.
    pub fn resolve_instructions(&self, context_variables: &ContextVariables) -> String {
        self.instructions.resolve(context_variables)
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("model", &self.model)
            .field(
                "tools",
                &self.tools.iter().map(|t| t.name()).collect::<Vec<_>>(),
            )
            .field("tool_choice", &self.tool_choice)
            .field("parallel_tool_calls", &self.parallel_tool_calls)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::FunctionTool;

    #[test]
    fn defaults_match_a_plain_helper() {
        let agent = Agent::default();
        assert_eq!(agent.name(), "Agent");
        assert_eq!(agent.model(), None);
        assert!(agent.tools().is_empty());
        assert!(agent.parallel_tool_calls());
        assert_eq!(
            agent.resolve_instructions(&ContextVariables::new()),
            "You are a helpful agent."
        );
    }

    #[test]
    fn tool_choice_serializes_like_the_wire_format() {
        assert_eq!(serde_json::to_value(ToolChoice::Auto).unwrap(), "auto");
        assert_eq!(serde_json::to_value(ToolChoice::Required).unwrap(), "required");
        assert_eq!(
            serde_json::to_value(ToolChoice::Function("lookup".into())).unwrap(),
            serde_json::json!({ "type": "function", "function": { "name": "lookup" } })
        );
    }

    #[test]
    fn builder_collects_tools_and_policy() {
        let noop = FunctionTool::new("noop", "", Vec::new(), |_args| async {
            Ok("".into())
        });
        let agent = Agent::new("Triage")
            .with_model("gpt-4o-mini")
            .with_tool(noop.shared())
            .with_tool_choice(ToolChoice::Required)
            .with_parallel_tool_calls(false);
        assert_eq!(agent.model(), Some("gpt-4o-mini"));
        assert_eq!(agent.tools()[0].name(), "noop");
        assert_eq!(agent.tool_choice(), Some(&ToolChoice::Required));
        assert!(!agent.parallel_tool_calls());
        assert!(format!("{agent:?}").contains("noop"));
    }
}
