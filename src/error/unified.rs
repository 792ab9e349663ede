//! Unified error classification and recovery.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Machine-readable error code carried by escalation events.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Quota,
    RateLimited,
    Authentication,
    ModelNotFound,
    Configuration,
    InvalidRequest,
    MalformedResponse,
    EmptyResponse,
    ServerError,
    Timeout,
    Network,
    UnknownTool,
    ToolExecutionFailure,
    LoopLimitExceeded,
    Unknown,
}

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    RateLimit,
    Network,
    Timeout,
    Server,
    Api,
    Configuration,
    Serialization,
    ToolExecution,
    Unknown,
}

/// Suggested recovery action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySuggestion {
    RetryWithBackoff,
    CheckCredentials,
    CheckConfiguration,
    IncreaseTimeout,
    CheckToolImplementation,
    ContactSupport,
}

impl RecoverySuggestion {
    /// Short hint shown to CLI users.
    pub fn hint(&self) -> &'static str {
        match self {
            Self::RetryWithBackoff => "wait a moment and try again",
            Self::CheckCredentials => "check the provider API key (e.g. GOOGLE_API_KEY)",
            Self::CheckConfiguration => "check the model name and HELM_* settings",
            Self::IncreaseTimeout => "the provider did not answer in time; try again",
            Self::CheckToolImplementation => "a tool failed; check its implementation",
            Self::ContactSupport => "unexpected failure; rerun with RUST_LOG=helm=debug",
        }
    }
}
