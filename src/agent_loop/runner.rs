//! The orchestrator run loop.

use std::fmt;
use std::sync::Arc;

use futures::stream::BoxStream;
use futures::StreamExt;
use serde_json::Value;

use crate::agent::Agent;
use crate::backend::{Backend, CompletionRequest};
use crate::config::SwarmConfig;
use crate::debug::DebugChannel;
use crate::dispatch::ToolDispatcher;
use crate::error::SwarmError;
use crate::merge::TurnAccumulator;
use crate::tools::function_to_schema;
use crate::types::{ContextVariables, Message, Role};

use super::events::StreamEvent;
use super::types::{RunId, RunRequest, Response};

/// Events of a streamed run, in order.
pub type RunEventStream = BoxStream<'static, Result<StreamEvent, SwarmError>>;

/// Multi-agent orchestrator.
///
/// Cheap to clone; clones share the backend.
#[derive(Clone)]
pub struct Swarm {
    backend: Arc<dyn Backend>,
    config: SwarmConfig,
}

impl Swarm {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            config: SwarmConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SwarmConfig) -> Self {
        self.config = config;
        self
    }

    /// Build an orchestrator backed by the OpenAI chat-completions API.
    #[cfg(feature = "openai")]
    pub fn from_config(config: SwarmConfig) -> Result<Self, SwarmError> {
        let backend = crate::backend::openai::OpenAiBackend::from_config(&config)?;
        Ok(Self::new(Arc::new(backend)).with_config(config))
    }

    pub fn config(&self) -> &SwarmConfig {
        &self.config
    }

    /// Assemble the backend request for `agent`'s next turn.
    ///
    /// Fails with a schema error before anything is sent if a tool cannot be
    /// described.
    pub fn build_request(
        &self,
        agent: &Agent,
        history: &[Message],
        context_variables: &ContextVariables,
        model_override: Option<&str>,
        stream: bool,
    ) -> Result<CompletionRequest, SwarmError> {
        let instructions = agent.resolve_instructions(context_variables);
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(Message::system(instructions));
        messages.extend_from_slice(history);

        let tools = agent
            .tools()
            .iter()
            .map(|tool| function_to_schema(tool.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let has_tools = !tools.is_empty();

        let model = model_override
            .or(agent.model())
            .unwrap_or(&self.config.default_model)
            .to_string();

        Ok(CompletionRequest {
            model,
            messages,
            tools: has_tools.then_some(tools),
            tool_choice: agent.tool_choice().cloned(),
            parallel_tool_calls: has_tools.then_some(agent.parallel_tool_calls()),
            stream,
        })
    }

    /// Request one complete assistant turn for `agent`.
    pub async fn get_chat_completion(
        &self,
        agent: &Agent,
        history: &[Message],
        context_variables: &ContextVariables,
        model_override: Option<&str>,
        debug: &DebugChannel,
    ) -> Result<Message, SwarmError> {
        let request = self.build_request(agent, history, context_variables, model_override, false)?;
        debug.emit_with(|| format!("Getting chat completion for...: {}", to_json(&request.messages)));
        let mut message = self.backend.complete(&request).await?;
        if message.tool_calls.as_ref().is_some_and(Vec::is_empty) {
            message.tool_calls = None;
        }
        Ok(message)
    }

    /// Run the loop to completion and return the appended turns.
    ///
    /// A request with `stream` set is driven through
    /// [`run_and_stream`](Self::run_and_stream) and only its final response
    /// is returned.
    pub async fn run(&self, request: RunRequest) -> Result<Response, SwarmError> {
        if request.stream {
            let mut events = self.run_and_stream(request);
            while let Some(event) = events.next().await {
                if let StreamEvent::Response(response) = event? {
                    return Ok(response);
                }
            }
            return Err(SwarmError::Stream(
                "run stream ended without a response".to_string(),
            ));
        }

        let mut state = RunState::new(request, self.config.debug);
        tracing::debug!(run_id = %state.run_id, agent = state.agent.name(), "swarm run started");

        while state.has_turns_left() {
            let message = self
                .get_chat_completion(
                    &state.agent,
                    &state.history,
                    &state.context_variables,
                    state.model_override.as_deref(),
                    &state.debug,
                )
                .await?;
            if !self.finish_turn(&mut state, message).await? {
                break;
            }
        }

        tracing::debug!(run_id = %state.run_id, appended = state.appended(), "swarm run completed");
        Ok(state.into_response())
    }

    /// Run the loop, yielding per-turn delimiters, raw deltas and the final
    /// response as they happen.
    ///
    /// The stream is lazy: nothing is requested until it is polled.
    pub fn run_and_stream(&self, request: RunRequest) -> RunEventStream {
        let swarm = self.clone();
        let stream = async_stream::try_stream! {
            let mut state = RunState::new(request, swarm.config.debug);
            tracing::debug!(run_id = %state.run_id, agent = state.agent.name(), "swarm stream started");

            while state.has_turns_left() {
                let completion = swarm.build_request(
                    &state.agent,
                    &state.history,
                    &state.context_variables,
                    state.model_override.as_deref(),
                    true,
                )?;
                state.debug.emit_with(|| {
                    format!("Getting chat completion for...: {}", to_json(&completion.messages))
                });
                let mut fragments = swarm.backend.stream(&completion).await?;

                let mut turn = TurnAccumulator::new(state.agent.name());
                yield StreamEvent::Start;
                while let Some(fragment) = fragments.next().await {
                    let delta = tag_sender(fragment?, state.agent.name());
                    yield StreamEvent::Delta(delta.clone());
                    for anomaly in turn.merge_chunk(delta) {
                        state.debug.emit(anomaly.to_string());
                    }
                }
                yield StreamEvent::End;

                let message = turn.finish()?;
                if !swarm.finish_turn(&mut state, message).await? {
                    break;
                }
            }

            tracing::debug!(run_id = %state.run_id, appended = state.appended(), "swarm stream completed");
            yield StreamEvent::Response(state.into_response());
        };
        Box::pin(stream)
    }

    /// Record a completed assistant turn and act on its tool calls.
    ///
    /// Returns `false` when the run should stop: the turn asked for no
    /// tools, or tool execution is disabled.
    async fn finish_turn(&self, state: &mut RunState, mut message: Message) -> Result<bool, SwarmError> {
        message.sender = Some(state.agent.name().to_string());
        state.debug.emit_with(|| format!("Received completion: {}", to_json(&message)));

        let tool_calls = message.tool_calls.clone().unwrap_or_default();
        state.history.push(message);
        if tool_calls.is_empty() || !state.execute_tools {
            state.debug.emit("Ending turn.");
            return Ok(false);
        }

        let outcome = ToolDispatcher::new(state.agent.tools(), &state.debug)
            .with_concurrency(self.config.concurrent_tools)
            .dispatch(&tool_calls, &state.context_variables)
            .await?;
        state.history.extend(outcome.messages);
        state.context_variables.merge(&outcome.context_variables);
        if let Some(next) = outcome.agent {
            tracing::debug!(run_id = %state.run_id, from = state.agent.name(), to = next.name(), "agent handoff");
            state.agent = next;
        }
        Ok(true)
    }
}

/// Mutable state of one run, shared by the blocking and streamed loops.
struct RunState {
    run_id: RunId,
    agent: Arc<Agent>,
    history: Vec<Message>,
    context_variables: ContextVariables,
    model_override: Option<String>,
    init_len: usize,
    max_turns: usize,
    execute_tools: bool,
    debug: DebugChannel,
}

impl RunState {
    fn new(request: RunRequest, force_debug: bool) -> Self {
        let debug = request.debug_channel(force_debug);
        let RunRequest {
            run_id,
            agent,
            messages,
            context_variables,
            model_override,
            max_turns,
            execute_tools,
            ..
        } = request;
        Self {
            run_id,
            agent,
            init_len: messages.len(),
            history: messages,
            context_variables,
            model_override,
            max_turns: max_turns.unwrap_or(usize::MAX),
            execute_tools,
            debug,
        }
    }

    fn appended(&self) -> usize {
        self.history.len() - self.init_len
    }

    fn has_turns_left(&self) -> bool {
        self.appended() < self.max_turns
    }

    fn into_response(mut self) -> Response {
        Response {
            messages: self.history.split_off(self.init_len),
            agent: self.agent,
            context_variables: self.context_variables,
        }
    }
}

impl fmt::Debug for Swarm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Swarm")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Attach the sender to assistant-origin deltas.
fn tag_sender(mut delta: Value, sender: &str) -> Value {
    if let Value::Object(fields) = &mut delta {
        let from_assistant =
            fields.get("role").and_then(Value::as_str) == Some(Role::Assistant.to_string().as_str());
        if from_assistant {
            fields.insert("sender".into(), Value::String(sender.to_string()));
        }
    }
    delta
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}
