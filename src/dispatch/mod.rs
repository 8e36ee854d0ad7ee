//! Resolves model-requested tool calls against an agent's tools.
//!
//! Each call becomes exactly one tool message, in request order. Context
//! deltas and handoff targets are folded in that same order, so the last
//! writer wins even when a batch executes concurrently.

use std::sync::Arc;

use futures::future;
use serde_json::Value;

use crate::agent::Agent;
use crate::debug::DebugChannel;
use crate::error::SwarmError;
use crate::tools::{Tool, ToolArguments, ToolResult, CONTEXT_VARIABLES};
use crate::types::{ContextVariables, Message, ToolCall};

/// Aggregated effect of one batch of tool calls.
#[derive(Debug, Clone, Default)]
pub struct DispatchOutcome {
    /// One tool message per request, in request order.
    pub messages: Vec<Message>,
    /// Handoff target chosen by the batch (last one wins).
    pub agent: Option<Arc<Agent>>,
    /// Merged context delta (later calls overwrite earlier keys).
    pub context_variables: ContextVariables,
}

enum Invocation {
    NotFound,
    Completed(ToolResult),
}

/// Executes tool-call batches for one agent's tool registry.
pub struct ToolDispatcher<'a> {
    tools: &'a [Arc<dyn Tool>],
    debug: &'a DebugChannel,
    concurrent: bool,
}

impl<'a> ToolDispatcher<'a> {
    pub fn new(tools: &'a [Arc<dyn Tool>], debug: &'a DebugChannel) -> Self {
        Self {
            tools,
            debug,
            concurrent: false,
        }
    }

    /// Run the calls of one batch concurrently instead of one after another.
    pub fn with_concurrency(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    /// Execute `calls` against the registry with a snapshot of `context_variables`.
    pub async fn dispatch(
        &self,
        calls: &[ToolCall],
        context_variables: &ContextVariables,
    ) -> Result<DispatchOutcome, SwarmError> {
        let mut outcome = DispatchOutcome::default();
        if self.concurrent && calls.len() > 1 {
            let invocations = future::join_all(
                calls
                    .iter()
                    .map(|call| self.invoke(call, context_variables)),
            )
            .await;
            for (call, invocation) in calls.iter().zip(invocations) {
                fold_invocation(&mut outcome, call, invocation?);
            }
        } else {
            for call in calls {
                let invocation = self.invoke(call, context_variables).await?;
                fold_invocation(&mut outcome, call, invocation);
            }
        }
        Ok(outcome)
    }

    async fn invoke(
        &self,
        call: &ToolCall,
        context_variables: &ContextVariables,
    ) -> Result<Invocation, SwarmError> {
        let name = call.function.name.as_str();
        let Some(tool) = self.tools.iter().rfind(|tool| tool.name() == name) else {
            tracing::warn!(tool = name, call_id = %call.id, "tool not found");
            self.debug
                .emit(format!("Tool {name} not found in function map."));
            return Ok(Invocation::NotFound);
        };

        let mut args = ToolArguments::parse(&call.function.arguments)?;
        self.debug.emit_with(|| {
            format!(
                "Processing tool call: {name} with arguments {}",
                Value::Object(args.raw().clone())
            )
        });
        if tool.accepts_context_variables() {
            args.insert(CONTEXT_VARIABLES, context_variables.to_value());
        }

        tracing::debug!(tool = name, call_id = %call.id, "executing tool");
        let output = tool.call(args).await.inspect_err(|err| {
            tracing::error!(tool = name, call_id = %call.id, error = %err, "tool failed");
        })?;
        let result = output.into_result(name).inspect_err(|err| {
            self.debug.emit(err.to_string());
        })?;
        Ok(Invocation::Completed(result))
    }
}

fn fold_invocation(outcome: &mut DispatchOutcome, call: &ToolCall, invocation: Invocation) {
    let name = &call.function.name;
    match invocation {
        Invocation::NotFound => outcome.messages.push(Message::tool(
            call.id.clone(),
            name.clone(),
            format!("Error: Tool {name} not found."),
        )),
        Invocation::Completed(result) => {
            outcome
                .messages
                .push(Message::tool(call.id.clone(), name.clone(), result.value));
            outcome.context_variables.merge(&result.context_variables);
            if let Some(agent) = result.agent {
                outcome.agent = Some(agent);
            }
        }
    }
}

/// Execute one batch sequentially; see [`ToolDispatcher`].
pub async fn handle_tool_calls(
    calls: &[ToolCall],
    tools: &[Arc<dyn Tool>],
    context_variables: &ContextVariables,
    debug: &DebugChannel,
) -> Result<DispatchOutcome, SwarmError> {
    ToolDispatcher::new(tools, debug)
        .dispatch(calls, context_variables)
        .await
}
