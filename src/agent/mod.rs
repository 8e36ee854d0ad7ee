//! Agent configuration: model, instructions, tools and tool-call policy.

pub mod agent;
pub mod instructions;

pub use agent::{Agent, ToolChoice};
pub use instructions::{DynamicInstructions, Instructions, StaticInstructions};
