//! Error types for helm.

pub mod unified;

pub use unified::{ErrorCategory, ErrorCode, RecoverySuggestion};

use thiserror::Error;

/// Primary error type for all helm operations.
#[derive(Error, Debug)]
pub enum HelmError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api {
        status: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Duplicate tool: {0}")]
    DuplicateTool(String),

    #[error("Tool execution error: {tool_name}: {message}")]
    ToolExecution { tool_name: String, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Empty response from {0}: no text and no tool calls")]
    EmptyResponse(String),

    #[error("Tool loop exceeded {max_round_trips} round trips")]
    LoopLimitExceeded { max_round_trips: usize },

    #[error("Session not found: {0}")]
    SessionNotFound(String),
}

impl HelmError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
            source: None,
        }
    }

    /// Create a tool execution error.
    pub fn tool_execution(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolExecution {
            tool_name: tool_name.into(),
            message: message.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::RateLimited { .. } | Self::QuotaExceeded(_) => ErrorCategory::RateLimit,
            Self::Network(_) => ErrorCategory::Network,
            Self::Timeout(_) => ErrorCategory::Timeout,
            Self::Configuration(_) | Self::ModelNotFound(_) => ErrorCategory::Configuration,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Api { status, .. } => match status {
                401 | 403 => ErrorCategory::Authentication,
                429 => ErrorCategory::RateLimit,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
            Self::UnknownTool(_)
            | Self::DuplicateTool(_)
            | Self::ToolExecution { .. }
            | Self::InvalidArgument(_) => ErrorCategory::ToolExecution,
            Self::EmptyResponse(_) => ErrorCategory::Api,
            _ => ErrorCategory::Unknown,
        }
    }

    /// Machine-readable code used when this error ends a turn.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::QuotaExceeded(_) => ErrorCode::Quota,
            Self::RateLimited { .. } => ErrorCode::RateLimited,
            Self::Authentication(_) => ErrorCode::Authentication,
            Self::Network(_) => ErrorCode::Network,
            Self::Timeout(_) => ErrorCode::Timeout,
            Self::ModelNotFound(_) => ErrorCode::ModelNotFound,
            Self::Configuration(_) => ErrorCode::Configuration,
            Self::Serialization(_) => ErrorCode::MalformedResponse,
            Self::EmptyResponse(_) => ErrorCode::EmptyResponse,
            Self::InvalidArgument(_) => ErrorCode::InvalidRequest,
            Self::UnknownTool(_) => ErrorCode::UnknownTool,
            Self::ToolExecution { .. } => ErrorCode::ToolExecutionFailure,
            Self::LoopLimitExceeded { .. } => ErrorCode::LoopLimitExceeded,
            Self::Api { status, .. } => match status {
                400 | 404 | 422 => ErrorCode::InvalidRequest,
                401 | 403 => ErrorCode::Authentication,
                429 => ErrorCode::RateLimited,
                500..=599 => ErrorCode::ServerError,
                _ => ErrorCode::Unknown,
            },
            _ => ErrorCode::Unknown,
        }
    }

    /// String form of [`HelmError::code`], as carried by escalation events.
    pub fn escalation_code(&self) -> String {
        self.code().to_string()
    }

    /// Whether this error is potentially retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::RateLimit
                | ErrorCategory::Network
                | ErrorCategory::Timeout
                | ErrorCategory::Server
        ) && !matches!(self, Self::QuotaExceeded(_))
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self.category() {
            ErrorCategory::Authentication => RecoverySuggestion::CheckCredentials,
            ErrorCategory::RateLimit => RecoverySuggestion::RetryWithBackoff,
            ErrorCategory::Network => RecoverySuggestion::RetryWithBackoff,
            ErrorCategory::Timeout => RecoverySuggestion::IncreaseTimeout,
            ErrorCategory::Server => RecoverySuggestion::RetryWithBackoff,
            ErrorCategory::Configuration => RecoverySuggestion::CheckConfiguration,
            ErrorCategory::ToolExecution => RecoverySuggestion::CheckToolImplementation,
            _ => RecoverySuggestion::ContactSupport,
        }
    }
}

impl From<reqwest::Error> for HelmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(crate::provider::http::REQUEST_TIMEOUT.as_millis() as u64)
        } else {
            Self::Network(err)
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, HelmError>;
