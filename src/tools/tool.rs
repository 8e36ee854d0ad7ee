//! Tool trait and closure-based tool wrapper.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use super::arguments::ToolArguments;
use super::output::ToolOutput;
use super::types::ToolParameter;
use crate::error::SwarmError;

/// Core tool trait -- implement to create custom tools.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (must match what the model calls).
    fn name(&self) -> &str;

    /// Human-readable description. Empty when the tool is undocumented.
    fn description(&self) -> &str {
        ""
    }

    /// Declared parameters, in call order.
    fn parameters(&self) -> &[ToolParameter];

    /// Whether the dispatcher should inject the run's context snapshot.
    fn accepts_context_variables(&self) -> bool {
        self.parameters().iter().any(ToolParameter::is_context_variables)
    }

    /// Invoke the tool with decoded arguments.
    async fn call(&self, args: ToolArguments) -> Result<ToolOutput, SwarmError>;
}

/// Type alias for the tool handler function.
type ToolHandler = dyn Fn(ToolArguments) -> Pin<Box<dyn Future<Output = Result<ToolOutput, SwarmError>> + Send>>
    + Send
    + Sync;

/// Closure-based tool for quick tool creation.
pub struct FunctionTool {
    name: String,
    description: String,
    parameters: Vec<ToolParameter>,
    handler: Arc<ToolHandler>,
}

impl FunctionTool {
    /// Create a tool from a closure.
    pub fn new<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Vec<ToolParameter>,
        handler: F,
    ) -> Self
    where
        F: Fn(ToolArguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ToolOutput, SwarmError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            handler: Arc::new(move |args| Box::pin(handler(args))),
        }
    }

    /// Wrap into a shareable trait object.
    pub fn shared(self) -> Arc<dyn Tool> {
        Arc::new(self)
    }
}

#[async_trait]
impl Tool for FunctionTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> &[ToolParameter] {
        &self.parameters
    }

    async fn call(&self, args: ToolArguments) -> Result<ToolOutput, SwarmError> {
        (self.handler)(args).await
    }
}

impl std::fmt::Debug for FunctionTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .finish()
    }
}
