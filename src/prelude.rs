//! Convenience re-exports for common use.

pub use crate::agent::Agent;
pub use crate::agent_loop::{final_response_text, RunConfig, Runner, TurnEvent, TurnOutcome};
pub use crate::config::HelmConfig;
pub use crate::error::{HelmError, Result};
pub use crate::models::LanguageModel;
pub use crate::provider::ModelProvider;
pub use crate::session::{SessionKey, SessionStore};
pub use crate::tools::{AgentTool, AgentToolParameters, Tool, ToolArguments, ToolOutcome};
pub use crate::types::{GenerationSettings, ModelMessage, Role};
