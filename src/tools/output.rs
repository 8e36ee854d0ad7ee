//! Tool return values and their normalized form.

use std::sync::Arc;

use serde_json::Value;

use crate::agent::Agent;
use crate::error::SwarmError;
use crate::types::ContextVariables;

/// Normalized result of one tool invocation.
#[derive(Debug, Clone, Default)]
pub struct ToolResult {
    /// Text reported back to the model.
    pub value: String,
    /// Agent to hand the conversation to, if any.
    pub agent: Option<Arc<Agent>>,
    /// Context updates to fold into the run.
    pub context_variables: ContextVariables,
}

impl ToolResult {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn with_agent(mut self, agent: Arc<Agent>) -> Self {
        self.agent = Some(agent);
        self
    }

    pub fn with_context_variables(mut self, context_variables: ContextVariables) -> Self {
        self.context_variables = context_variables;
        self
    }
}

/// Raw value returned by a tool, normalized once by the dispatcher.
#[derive(Debug, Clone)]
pub enum ToolOutput {
    Text(String),
    Json(Value),
    /// Raw bytes; must be UTF-8 to be reported to the model.
    Bytes(Vec<u8>),
    Result(ToolResult),
    Handoff(Arc<Agent>),
}

impl ToolOutput {
    /// Coerce into a [`ToolResult`].
    pub fn into_result(self, tool_name: &str) -> Result<ToolResult, SwarmError> {
        match self {
            Self::Result(result) => Ok(result),
            Self::Handoff(agent) => Ok(ToolResult {
                value: serde_json::json!({ "assistant": agent.name() }).to_string(),
                agent: Some(agent),
                context_variables: ContextVariables::new(),
            }),
            Self::Text(text) => Ok(ToolResult::new(text)),
            Self::Json(Value::String(text)) => Ok(ToolResult::new(text)),
            Self::Json(value) => Ok(ToolResult::new(value.to_string())),
            Self::Bytes(bytes) => match String::from_utf8(bytes) {
                Ok(text) => Ok(ToolResult::new(text)),
                Err(err) => Err(SwarmError::ResultCoercion {
                    tool_name: tool_name.to_string(),
                    value: format!("{:?}", err.as_bytes()),
                }),
            },
        }
    }
}

impl From<String> for ToolOutput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for ToolOutput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Value> for ToolOutput {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<Vec<u8>> for ToolOutput {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<ToolResult> for ToolOutput {
    fn from(result: ToolResult) -> Self {
        Self::Result(result)
    }
}

impl From<Arc<Agent>> for ToolOutput {
    fn from(agent: Arc<Agent>) -> Self {
        Self::Handoff(agent)
    }
}

impl From<Agent> for ToolOutput {
    fn from(agent: Agent) -> Self {
        Self::Handoff(Arc::new(agent))
    }
}
