//! Reducing a turn's event stream to the answer shown to the user.

use std::fmt;

use futures::{Stream, StreamExt};
use tracing::warn;

use super::events::TurnEvent;

/// Text returned when a turn's stream ends without a terminal event.
pub const NO_RESPONSE_TEXT: &str = "Agent failed to respond.";

/// How a turn ended, from the consumer's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Final(String),
    Escalated {
        error_code: String,
        error_message: String,
    },
    /// The stream closed before any terminal event.
    NoResponse,
}

impl TurnOutcome {
    /// User-visible text for this outcome.
    pub fn text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TurnOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Final(text) => f.write_str(text),
            Self::Escalated {
                error_code,
                error_message,
            } => write!(f, "Event escalation: {error_code} - {error_message}"),
            Self::NoResponse => f.write_str(NO_RESPONSE_TEXT),
        }
    }
}

/// Consume events up to and including the first terminal one.
pub async fn consume<S>(events: S) -> TurnOutcome
where
    S: Stream<Item = TurnEvent> + Unpin,
{
    consume_with(events, |_| {}).await
}

/// Like [`consume`], calling `observe` on every event read.
pub async fn consume_with<S, F>(mut events: S, mut observe: F) -> TurnOutcome
where
    S: Stream<Item = TurnEvent> + Unpin,
    F: FnMut(&TurnEvent),
{
    while let Some(event) = events.next().await {
        observe(&event);
        match event {
            TurnEvent::FinalResponse { text } => return TurnOutcome::Final(text),
            TurnEvent::Escalation {
                error_code,
                error_message,
            } => {
                return TurnOutcome::Escalated {
                    error_code,
                    error_message,
                }
            }
            TurnEvent::ToolCall { .. } | TurnEvent::ToolResult { .. } => {}
        }
    }
    warn!(code = "MALFORMED_EVENT_STREAM", "event stream ended without a terminal event");
    TurnOutcome::NoResponse
}

/// The final text of a turn: the answer, the escalation line, or
/// [`NO_RESPONSE_TEXT`].
pub async fn final_response_text<S>(events: S) -> String
where
    S: Stream<Item = TurnEvent> + Unpin,
{
    consume(events).await.text()
}
