//! Shared test helpers and scripted backend.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use swarm::backend::{Backend, CompletionRequest, FragmentStream};
use swarm::debug::DebugSink;
use swarm::error::SwarmError;
use swarm::types::{Message, ToolCall};

enum Scripted {
    Turn(Message),
    Fragments(Vec<Value>),
    Failure(u16, String),
}

/// A backend that replays queued turns and records every request.
#[derive(Default)]
pub struct ScriptedBackend {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a plain text reply.
    pub fn queue_response(&self, text: &str) {
        self.push(Scripted::Turn(Message::assistant(text)));
    }

    /// Queue a reply requesting one tool call.
    pub fn queue_tool_call(&self, id: &str, name: &str, args: Value) {
        self.queue_tool_calls(vec![ToolCall::function(id, name, args.to_string())]);
    }

    /// Queue a reply requesting several tool calls.
    pub fn queue_tool_calls(&self, calls: Vec<ToolCall>) {
        self.push(Scripted::Turn(Message::assistant_tool_calls(calls)));
    }

    /// Queue one streamed turn as raw delta fragments.
    pub fn queue_fragments(&self, fragments: Vec<Value>) {
        self.push(Scripted::Fragments(fragments));
    }

    /// Queue a backend failure.
    pub fn queue_failure(&self, status: u16, message: &str) {
        self.push(Scripted::Failure(status, message.to_string()));
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn push(&self, item: Scripted) {
        self.script.lock().unwrap().push_back(item);
    }

    fn next(&self, request: &CompletionRequest) -> Scripted {
        self.requests.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Scripted::Turn(Message::assistant("Mock response")))
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<Message, SwarmError> {
        match self.next(request) {
            Scripted::Turn(message) => Ok(message),
            Scripted::Fragments(_) => panic!("streamed turn queued for a blocking request"),
            Scripted::Failure(status, message) => Err(SwarmError::api(status, message)),
        }
    }

    async fn stream(&self, request: &CompletionRequest) -> Result<FragmentStream, SwarmError> {
        let fragments = match self.next(request) {
            Scripted::Fragments(fragments) => fragments,
            Scripted::Turn(message) => vec![as_fragment(&message)?],
            Scripted::Failure(status, message) => return Err(SwarmError::api(status, message)),
        };
        Ok(Box::pin(futures::stream::iter(fragments.into_iter().map(Ok))))
    }
}

/// A whole turn as a single delta, with tool calls tagged by position.
fn as_fragment(message: &Message) -> Result<Value, SwarmError> {
    let mut fragment = serde_json::to_value(message)?;
    if let Some(Value::Array(calls)) = fragment.get_mut("tool_calls") {
        for (index, call) in calls.iter_mut().enumerate() {
            if let Value::Object(call) = call {
                call.insert("index".into(), index.into());
            }
        }
    }
    Ok(fragment)
}

/// Debug sink that collects lines for assertions.
pub fn capture_debug() -> (DebugSink, Arc<Mutex<Vec<String>>>) {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink_lines = lines.clone();
    let sink: DebugSink = Arc::new(move |line: &str| {
        sink_lines.lock().unwrap().push(line.to_string());
    });
    (sink, lines)
}
