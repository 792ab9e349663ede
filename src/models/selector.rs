//! Model selection and parsing.

use std::str::FromStr;

use super::LanguageModel;
use crate::error::HelmError;

/// Parse a "provider:model" string into a LanguageModel.
pub struct ModelSelector;

impl ModelSelector {
    /// Parse "provider:model_id" (or "provider/model_id") into a LanguageModel.
    ///
    /// Examples: "google:gemini-2.0-flash", "openai/gpt-4o",
    /// "anthropic:claude-3-sonnet-20240229". Everything after the first
    /// separator is the model id. Unknown providers become
    /// [`LanguageModel::Custom`].
    pub fn parse(s: &str) -> Result<LanguageModel, HelmError> {
        let (provider, model_id) = s.split_once(|c: char| c == ':' || c == '/').ok_or_else(|| {
            HelmError::InvalidArgument(format!(
                "Invalid model selector '{s}': expected 'provider:model_id'"
            ))
        })?;
        if model_id.is_empty() {
            return Err(HelmError::InvalidArgument(format!(
                "Invalid model selector '{s}': empty model id"
            )));
        }

        match provider {
            #[cfg(feature = "google")]
            "google" | "gemini" => {
                use super::google::GoogleModel;
                let m = GoogleModel::from_str(model_id)
                    .unwrap_or(GoogleModel::Custom(model_id.to_string()));
                Ok(LanguageModel::Google(m))
            }
            #[cfg(feature = "openai")]
            "openai" => {
                use super::openai::OpenAiModel;
                let m = OpenAiModel::from_str(model_id)
                    .unwrap_or(OpenAiModel::Custom(model_id.to_string()));
                Ok(LanguageModel::OpenAi(m))
            }
            #[cfg(feature = "anthropic")]
            "anthropic" => {
                use super::anthropic::AnthropicModel;
                let m = AnthropicModel::from_str(model_id)
                    .unwrap_or(AnthropicModel::Custom(model_id.to_string()));
                Ok(LanguageModel::Anthropic(m))
            }
            _ => Ok(LanguageModel::Custom {
                provider: provider.to_string(),
                model_id: model_id.to_string(),
            }),
        }
    }
}

impl FromStr for LanguageModel {
    type Err = HelmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelSelector::parse(s)
    }
}
