//! Agent definition: model, instruction and tools bound together.

use std::sync::Arc;

use crate::error::HelmError;
use crate::models::LanguageModel;
use crate::tools::builtin::weather_tool;
use crate::tools::tool::Tool;
use crate::tools::ToolRegistry;
use crate::types::*;

/// Name of the agent built by [`weather_agent`].
pub const WEATHER_AGENT_NAME: &str = "weather_agent_v1";

const WEATHER_AGENT_INSTRUCTION: &str = "You are a helpful weather assistant. \
When the user asks for the weather in a specific city, use the 'get_weather' tool to find the information. \
If the tool returns an error, inform the user politely. \
If the tool is successful, present the weather report clearly.";

/// What the runner needs to know about an agent: which model to ask, what
/// to tell it up front, and which tools it may call.
///
/// Agents are immutable once built and shared between turns via `Arc`.
#[derive(Debug, Clone)]
pub struct Agent {
    name: String,
    description: String,
    model: LanguageModel,
    instruction: String,
    tools: ToolRegistry,
    settings: GenerationSettings,
}

impl Agent {
    /// Create an agent with no instruction and no tools.
    pub fn new(name: impl Into<String>, model: LanguageModel) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            model,
            instruction: String::new(),
            tools: ToolRegistry::new(),
            settings: GenerationSettings::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the instruction sent as the system message of every request.
    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    /// Add a tool. Fails when a tool of the same name is already present.
    pub fn with_tool(mut self, tool: impl Tool + 'static) -> Result<Self, HelmError> {
        self.tools.register(tool)?;
        Ok(self)
    }

    pub fn with_shared_tool(mut self, tool: Arc<dyn Tool>) -> Result<Self, HelmError> {
        self.tools.register_arc(tool)?;
        Ok(self)
    }

    /// Replace the whole tool registry.
    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn model(&self) -> &LanguageModel {
        &self.model
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// System message for this agent, if it has an instruction.
    pub fn system_message(&self) -> Option<ModelMessage> {
        (!self.instruction.is_empty()).then(|| ModelMessage::system(self.instruction.clone()))
    }
}

/// The stock weather assistant, wired with `get_weather`.
pub fn weather_agent(model: LanguageModel) -> Agent {
    Agent::new(WEATHER_AGENT_NAME, model)
        .with_description("Provides weather information for specific cities.")
        .with_instruction(WEATHER_AGENT_INSTRUCTION)
        .with_tools(weather_registry())
}

fn weather_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    // Fresh registry, so the name cannot collide.
    let _ = registry.register(weather_tool());
    registry
}
