//! Convenience re-exports for common use.

pub use crate::agent::{Agent, ToolChoice};
pub use crate::agent_loop::{Response, RunRequest, StreamEvent, Swarm};
pub use crate::backend::{Backend, CompletionRequest};
pub use crate::config::SwarmConfig;
pub use crate::error::{Result, SwarmError};
pub use crate::tools::{FunctionTool, Tool, ToolArguments, ToolOutput, ToolParameter, ToolResult};
pub use crate::types::{ContextVariables, Message, Role, ToolCall};
