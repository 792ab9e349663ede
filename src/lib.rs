//! helm: a tool-calling agent turn runner.
//!
//! A turn takes one user message, lets the agent's model decide whether to
//! call tools, dispatches those calls, feeds the results back, and ends with
//! either a final answer or an escalation. Every step is recorded in the
//! session and surfaced as a [`TurnEvent`](agent_loop::TurnEvent).
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use helm::prelude::*;
//! use helm::agent::weather_agent;
//! use helm::session::InMemorySessionStore;
//!
//! # async fn example() -> helm::error::Result<()> {
//! let config = HelmConfig::from_env();
//! let agent = Arc::new(weather_agent(config.default_model()?));
//! let runner = Runner::from_config(agent, Arc::new(InMemorySessionStore::new()), &config)?;
//!
//! let events = runner.run("user_1", "session_001", "What is the weather in London?");
//! println!("{}", final_response_text(events).await);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod agent_loop;
pub mod config;
pub mod error;
pub mod models;
pub mod prelude;
pub mod provider;
pub mod session;
pub mod tools;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;
