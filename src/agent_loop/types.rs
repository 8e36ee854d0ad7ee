//! Core run types for the agent loop.

use std::sync::Arc;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::agent::Agent;
use crate::debug::{DebugChannel, DebugSink};
use crate::types::{ContextVariables, Message};

/// Unique run identifier.
pub type RunId = Uuid;

/// Input to one orchestrated run.
///
/// The history and context are copied into the run's working state, so the
/// caller's values are never modified.
#[derive(Clone)]
pub struct RunRequest {
    pub run_id: RunId,
    pub agent: Arc<Agent>,
    pub messages: Vec<Message>,
    pub context_variables: ContextVariables,
    /// Model used instead of the agent's own for every turn of this run.
    pub model_override: Option<String>,
    pub stream: bool,
    pub debug: bool,
    /// Maximum number of messages appended before the run stops; `None` is unbounded.
    pub max_turns: Option<usize>,
    pub execute_tools: bool,
    pub debug_sink: Option<DebugSink>,
}

impl RunRequest {
    pub fn new(agent: impl Into<Arc<Agent>>, messages: Vec<Message>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            agent: agent.into(),
            messages,
            context_variables: ContextVariables::new(),
            model_override: None,
            stream: false,
            debug: false,
            max_turns: None,
            execute_tools: true,
            debug_sink: None,
        }
    }

    pub fn with_context_variables(mut self, context_variables: ContextVariables) -> Self {
        self.context_variables = context_variables;
        self
    }

    pub fn with_model_override(mut self, model: impl Into<String>) -> Self {
        self.model_override = Some(model.into());
        self
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = Some(max_turns);
        self
    }

    pub fn with_execute_tools(mut self, execute_tools: bool) -> Self {
        self.execute_tools = execute_tools;
        self
    }

    /// Route debug lines to `sink` instead of stderr.
    pub fn with_debug_sink(mut self, sink: DebugSink) -> Self {
        self.debug_sink = Some(sink);
        self
    }

    pub(crate) fn debug_channel(&self, force: bool) -> DebugChannel {
        let channel = DebugChannel::new(self.debug || force);
        match &self.debug_sink {
            Some(sink) => channel.with_sink(sink.clone()),
            None => channel,
        }
    }
}

impl std::fmt::Debug for RunRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunRequest")
            .field("run_id", &self.run_id)
            .field("agent", &self.agent.name())
            .field("messages", &self.messages.len())
            .field("context_variables", &self.context_variables)
            .field("model_override", &self.model_override)
            .field("stream", &self.stream)
            .field("debug", &self.debug)
            .field("max_turns", &self.max_turns)
            .field("execute_tools", &self.execute_tools)
            .finish()
    }
}

/// Result of a run: the turns it appended, the agent active at the end, and
/// the final context.
#[derive(Debug, Clone)]
pub struct Response {
    pub messages: Vec<Message>,
    pub agent: Arc<Agent>,
    pub context_variables: ContextVariables,
}

impl Response {
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn agent_name(&self) -> &str {
        self.agent.name()
    }
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Response", 3)?;
        state.serialize_field("messages", &self.messages)?;
        state.serialize_field("agent", self.agent.name())?;
        state.serialize_field("context_variables", &self.context_variables)?;
        state.end()
    }
}
