//! Completion backend trait and implementations.

#[cfg(feature = "openai")]
pub mod http;
#[cfg(feature = "openai")]
pub mod openai;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::Serialize;
use serde_json::Value;

use crate::agent::ToolChoice;
use crate::error::SwarmError;
use crate::tools::ToolDefinition;
use crate::types::{Message, Role};

/// Raw delta fragments of one streamed assistant turn.
pub type FragmentStream = BoxStream<'static, Result<Value, SwarmError>>;

/// A request for one assistant turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    /// System instructions first, then the conversation history.
    pub messages: Vec<Message>,
    /// Omitted entirely when the agent has no tools.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
    /// Only sent alongside tools.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel_tool_calls: Option<bool>,
    pub stream: bool,
}

impl CompletionRequest {
    /// The system instructions this request was built with.
    pub fn instructions(&self) -> Option<&str> {
        self.messages
            .first()
            .filter(|m| m.role == Role::System)
            .map(Message::text)
    }

    /// Names of the tools offered to the model.
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools
            .iter()
            .flatten()
            .map(ToolDefinition::name)
            .collect()
    }
}

/// Chat-completion service used by the orchestrator.
///
/// `complete` returns the whole assistant turn. `stream` returns the raw delta
/// objects of the turn in arrival order, which the orchestrator folds with
/// [`TurnAccumulator`](crate::merge::TurnAccumulator).
#[async_trait]
pub trait Backend: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Message, SwarmError>;

    async fn stream(&self, request: &CompletionRequest) -> Result<FragmentStream, SwarmError>;
}
