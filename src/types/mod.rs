//! Core types for swarm.

pub mod context;
pub mod message;

pub use context::*;
pub use message::*;
