//! Anthropic model definitions.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Anthropic models.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
pub enum AnthropicModel {
    #[strum(serialize = "claude-sonnet-4-20250514")]
    ClaudeSonnet4,
    #[strum(serialize = "claude-3-5-haiku-20241022")]
    ClaudeHaiku35,
    #[strum(serialize = "claude-3-sonnet-20240229")]
    Claude3Sonnet,
    /// Custom/unknown Anthropic model by ID.
    #[strum(default)]
    Custom(String),
}

impl AnthropicModel {
    pub fn as_str(&self) -> &str {
        match self {
            Self::ClaudeSonnet4 => "claude-sonnet-4-20250514",
            Self::ClaudeHaiku35 => "claude-3-5-haiku-20241022",
            Self::Claude3Sonnet => "claude-3-sonnet-20240229",
            Self::Custom(s) => s,
        }
    }
}
