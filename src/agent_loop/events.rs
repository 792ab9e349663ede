//! Turn event types emitted by the runner.

use serde::{Deserialize, Serialize};

use crate::tools::ToolOutcome;

/// One step of a turn, as observed by consumers.
///
/// A turn emits any number of `ToolCall`/`ToolResult` pairs followed by
/// exactly one terminal event (`FinalResponse` or `Escalation`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnEvent {
    ToolCall {
        call_id: String,
        tool_name: String,
        arguments: serde_json::Value,
    },
    ToolResult {
        call_id: String,
        tool_name: String,
        result: ToolOutcome,
    },
    FinalResponse {
        text: String,
    },
    Escalation {
        error_code: String,
        error_message: String,
    },
}

impl TurnEvent {
    pub fn final_response(text: impl Into<String>) -> Self {
        Self::FinalResponse { text: text.into() }
    }

    pub fn escalation(error_code: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self::Escalation {
            error_code: error_code.into(),
            error_message: error_message.into(),
        }
    }

    /// Whether this event ends the turn.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::FinalResponse { .. } | Self::Escalation { .. })
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ToolCall { .. } => "tool_call",
            Self::ToolResult { .. } => "tool_result",
            Self::FinalResponse { .. } => "final_response",
            Self::Escalation { .. } => "escalation",
        }
    }
}
