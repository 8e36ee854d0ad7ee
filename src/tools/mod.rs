//! Tool system: declaration, schema generation, argument access, and return values.

pub mod arguments;
pub mod output;
pub mod schema;
pub mod tool;
pub mod types;

pub use arguments::ToolArguments;
pub use output::{ToolOutput, ToolResult};
pub use schema::{function_to_schema, FunctionDefinition, ToolDefinition};
pub use tool::{FunctionTool, Tool};
pub use types::{ParameterType, ToolParameter};

/// Reserved parameter name through which a tool receives the run's context.
///
/// It is injected at dispatch time and never shown to the model.
pub const CONTEXT_VARIABLES: &str = "context_variables";
