//! OpenAI model definitions.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// OpenAI chat models.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
pub enum OpenAiModel {
    #[strum(serialize = "gpt-4o")]
    Gpt4o,
    #[strum(serialize = "gpt-4o-mini")]
    Gpt4oMini,
    #[strum(serialize = "gpt-4.1")]
    Gpt41,
    #[strum(serialize = "gpt-4.1-mini")]
    Gpt41Mini,
    /// Custom/unknown OpenAI model by ID.
    #[strum(default)]
    Custom(String),
}

impl OpenAiModel {
    /// Get the API model identifier.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Gpt4o => "gpt-4o",
            Self::Gpt4oMini => "gpt-4o-mini",
            Self::Gpt41 => "gpt-4.1",
            Self::Gpt41Mini => "gpt-4.1-mini",
            Self::Custom(s) => s,
        }
    }
}
