//! Agents: the capabilities a turn may use.

pub mod agent;

pub use agent::{weather_agent, Agent, WEATHER_AGENT_NAME};
