//! Model references and selection.

pub mod selector;

#[cfg(feature = "anthropic")]
pub mod anthropic;
#[cfg(feature = "google")]
pub mod google;
#[cfg(feature = "openai")]
pub mod openai;

pub use selector::ModelSelector;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Model used when nothing else is configured.
pub const DEFAULT_MODEL: &str = "google:gemini-2.0-flash";

/// A reference to a model, resolved to a provider by
/// [`create_provider`](crate::provider::create_provider).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "provider", content = "model")]
pub enum LanguageModel {
    #[cfg(feature = "google")]
    Google(google::GoogleModel),
    #[cfg(feature = "openai")]
    OpenAi(openai::OpenAiModel),
    #[cfg(feature = "anthropic")]
    Anthropic(anthropic::AnthropicModel),
    /// Model served by a provider without a built-in transport.
    Custom { provider: String, model_id: String },
}

impl LanguageModel {
    /// Get the model's API identifier string.
    pub fn model_id(&self) -> &str {
        match self {
            #[cfg(feature = "google")]
            Self::Google(m) => m.as_str(),
            #[cfg(feature = "openai")]
            Self::OpenAi(m) => m.as_str(),
            #[cfg(feature = "anthropic")]
            Self::Anthropic(m) => m.as_str(),
            Self::Custom { model_id, .. } => model_id,
        }
    }

    /// Get the provider name.
    pub fn provider_name(&self) -> &str {
        match self {
            #[cfg(feature = "google")]
            Self::Google(_) => "google",
            #[cfg(feature = "openai")]
            Self::OpenAi(_) => "openai",
            #[cfg(feature = "anthropic")]
            Self::Anthropic(_) => "anthropic",
            Self::Custom { provider, .. } => provider,
        }
    }
}

impl fmt::Display for LanguageModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider_name(), self.model_id())
    }
}
