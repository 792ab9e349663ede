//! Google Gemini model definitions.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Gemini models.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
pub enum GoogleModel {
    #[strum(serialize = "gemini-2.0-flash")]
    Gemini20Flash,
    #[strum(serialize = "gemini-2.0-flash-lite")]
    Gemini20FlashLite,
    #[strum(serialize = "gemini-2.5-flash")]
    Gemini25Flash,
    #[strum(serialize = "gemini-2.5-pro")]
    Gemini25Pro,
    /// Custom/unknown Gemini model by ID.
    #[strum(default)]
    Custom(String),
}

impl GoogleModel {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Gemini20Flash => "gemini-2.0-flash",
            Self::Gemini20FlashLite => "gemini-2.0-flash-lite",
            Self::Gemini25Flash => "gemini-2.5-flash",
            Self::Gemini25Pro => "gemini-2.5-pro",
            Self::Custom(s) => s,
        }
    }
}
