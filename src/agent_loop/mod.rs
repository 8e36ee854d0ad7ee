//! Agent loop: run requests, the orchestrator, and streamed events.

pub mod events;
pub mod runner;
pub mod types;

pub use events::*;
pub use runner::*;
pub use types::*;
