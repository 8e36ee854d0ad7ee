//! Swarm — lightweight multi-agent orchestration over chat-completion backends
//!
//! Agents bundle instructions, a model and tools. The [`Swarm`](agent_loop::Swarm)
//! orchestrator asks a backend for assistant turns, executes the tool calls they
//! request, threads context variables through those tools, and switches the
//! active agent when a tool hands off.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use swarm::prelude::*;
//!
//! # async fn example() -> swarm::error::Result<()> {
//! let sales = Arc::new(Agent::new("Sales").with_instructions("Sell things."));
//! let transfer = FunctionTool::new("transfer_to_sales", "Hand off to sales.", Vec::new(), {
//!     let sales = sales.clone();
//!     move |_args| {
//!         let sales = sales.clone();
//!         async move { Ok(ToolOutput::Handoff(sales)) }
//!     }
//! });
//! let triage = Agent::new("Triage").with_tool(transfer.shared());
//!
//! let swarm = Swarm::from_config(SwarmConfig::from_env())?;
//! let response = swarm
//!     .run(RunRequest::new(triage, vec![Message::user("I want to buy a car")]))
//!     .await?;
//! println!("{}: {}", response.agent_name(), response.messages.last().map(Message::text).unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod agent_loop;
pub mod backend;
pub mod config;
pub mod debug;
pub mod dispatch;
pub mod error;
pub mod merge;
pub mod prelude;
pub mod tools;
pub mod types;
