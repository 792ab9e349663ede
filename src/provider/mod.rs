//! Model provider trait and implementations.
//!
//! A provider turns one [`ProviderRequest`] (instruction, history, tool
//! descriptions) into one decision: free text, or one or more tool calls.

pub mod http;

#[cfg(feature = "anthropic")]
pub mod anthropic;
#[cfg(feature = "google")]
pub mod google;
#[cfg(feature = "openai")]
pub mod openai;

use async_trait::async_trait;

use crate::config::HelmConfig;
use crate::error::HelmError;
use crate::models::LanguageModel;
use crate::types::{AgentToolCall, FinishReason, GenerationSettings, ModelMessage, Usage};

/// A request sent to a model provider.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub messages: Vec<ModelMessage>,
    pub settings: GenerationSettings,
    pub tools: Option<Vec<ToolDefinition>>,
}

/// Tool definition sent to the provider API.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Response from a provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderResponse {
    pub text: String,
    pub usage: Usage,
    pub tool_calls: Vec<AgentToolCall>,
    pub finish_reason: Option<FinishReason>,
}

impl ProviderResponse {
    /// A plain-text answer.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            finish_reason: Some(FinishReason::Stop),
            ..Default::default()
        }
    }

    /// A decision to call tools.
    pub fn tool_calls(calls: Vec<AgentToolCall>) -> Self {
        Self {
            tool_calls: calls,
            finish_reason: Some(FinishReason::ToolCalls),
            ..Default::default()
        }
    }

    /// Whether the model asked for at least one tool call.
    pub fn wants_tools(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Core trait implemented by all model providers.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name (e.g., "openai", "google").
    fn provider_name(&self) -> &str;

    /// The model ID this provider instance serves.
    fn model_id(&self) -> &str;

    /// Ask the model for its next decision.
    async fn generate_text(&self, request: &ProviderRequest)
        -> Result<ProviderResponse, HelmError>;
}

/// Create a provider for the given model, using the provided config.
#[allow(unused_variables)]
pub fn create_provider(
    model: &LanguageModel,
    config: &HelmConfig,
) -> Result<Box<dyn ModelProvider>, HelmError> {
    match model {
        #[cfg(feature = "google")]
        LanguageModel::Google(m) => {
            let api_key = config
                .get_api_key("google")
                .ok_or_else(|| HelmError::Authentication("Missing GOOGLE_API_KEY".into()))?;
            Ok(Box::new(google::GoogleProvider::new(
                m.clone(),
                api_key,
                config.get_base_url("google"),
            )))
        }
        #[cfg(feature = "openai")]
        LanguageModel::OpenAi(m) => {
            let api_key = config
                .get_api_key("openai")
                .ok_or_else(|| HelmError::Authentication("Missing OPENAI_API_KEY".into()))?;
            Ok(Box::new(openai::OpenAiProvider::new(
                m.clone(),
                api_key,
                config.get_base_url("openai"),
            )))
        }
        #[cfg(feature = "anthropic")]
        LanguageModel::Anthropic(m) => {
            let api_key = config
                .get_api_key("anthropic")
                .ok_or_else(|| HelmError::Authentication("Missing ANTHROPIC_API_KEY".into()))?;
            Ok(Box::new(anthropic::AnthropicProvider::new(
                m.clone(),
                api_key,
                config.get_base_url("anthropic"),
            )))
        }
        LanguageModel::Custom { provider, .. } => Err(HelmError::ModelNotFound(format!(
            "No built-in provider for '{provider}'"
        ))),
    }
}
