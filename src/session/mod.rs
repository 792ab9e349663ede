//! Per-conversation state: history of session events plus a key-value bag.

mod memory;

pub use memory::InMemorySessionStore;

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agent_loop::TurnEvent;
use crate::error::HelmError;
use crate::types::{AgentToolCall, ModelMessage};

/// Author recorded on events that carry the end user's input.
pub const USER_AUTHOR: &str = "user";

/// Identity of a session. All three parts are opaque to the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionKey {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
}

impl SessionKey {
    pub fn new(
        app_name: impl Into<String>,
        user_id: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            user_id: user_id.into(),
            session_id: session_id.into(),
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.app_name, self.user_id, self.session_id)
    }
}

/// Payload of a session event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum EventContent {
    UserMessage(String),
    Turn(TurnEvent),
}

/// One entry of a session's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEvent {
    pub id: Uuid,
    /// Groups every event produced by the same turn.
    pub invocation_id: Uuid,
    pub author: String,
    pub timestamp: DateTime<Utc>,
    pub content: EventContent,
}

impl SessionEvent {
    pub fn user_message(invocation_id: Uuid, text: impl Into<String>) -> Self {
        Self::new(invocation_id, USER_AUTHOR, EventContent::UserMessage(text.into()))
    }

    pub fn turn(invocation_id: Uuid, author: impl Into<String>, event: TurnEvent) -> Self {
        Self::new(invocation_id, author, EventContent::Turn(event))
    }

    fn new(invocation_id: Uuid, author: impl Into<String>, content: EventContent) -> Self {
        Self {
            id: Uuid::new_v4(),
            invocation_id,
            author: author.into(),
            timestamp: Utc::now(),
            content,
        }
    }

    /// The turn event carried by this entry, if any.
    pub fn turn_event(&self) -> Option<&TurnEvent> {
        match &self.content {
            EventContent::Turn(event) => Some(event),
            EventContent::UserMessage(_) => None,
        }
    }

    /// Model-facing form of this entry. Escalations are not replayed.
    pub fn to_model_message(&self) -> Option<ModelMessage> {
        match &self.content {
            EventContent::UserMessage(text) => Some(ModelMessage::user(text.clone())),
            EventContent::Turn(TurnEvent::ToolCall {
                call_id,
                tool_name,
                arguments,
            }) => Some(ModelMessage::assistant_tool_calls(vec![AgentToolCall {
                id: call_id.clone(),
                name: tool_name.clone(),
                arguments: arguments.clone(),
            }])),
            EventContent::Turn(TurnEvent::ToolResult {
                call_id,
                tool_name,
                result,
            }) => Some(ModelMessage::tool_result(
                call_id.clone(),
                tool_name.clone(),
                result.to_value(),
                !result.is_success(),
            )),
            EventContent::Turn(TurnEvent::FinalResponse { text }) => {
                Some(ModelMessage::assistant(text.clone()))
            }
            EventContent::Turn(TurnEvent::Escalation { .. }) => None,
        }
    }
}

/// A conversation between one user and one app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub key: SessionKey,
    pub events: Vec<SessionEvent>,
    pub state: HashMap<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(key: SessionKey) -> Self {
        let now = Utc::now();
        Self {
            key,
            events: Vec::new(),
            state: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// History converted to provider messages, oldest first.
    pub fn history(&self) -> Vec<ModelMessage> {
        self.events
            .iter()
            .filter_map(SessionEvent::to_model_message)
            .collect()
    }

    /// Events belonging to one turn, in order.
    pub fn invocation_events(&self, invocation_id: Uuid) -> impl Iterator<Item = &SessionEvent> {
        self.events
            .iter()
            .filter(move |e| e.invocation_id == invocation_id)
    }
}

/// Storage for sessions.
///
/// Methods return owned snapshots; mutations go through `append` and
/// `set_state` so implementations can keep their own locking.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch the session for `key`, creating an empty one on first access.
    async fn get_or_create(&self, key: &SessionKey) -> Result<Session, HelmError>;

    async fn get(&self, key: &SessionKey) -> Result<Option<Session>, HelmError>;

    /// Append one event to the history. Fails with
    /// [`HelmError::SessionNotFound`] for unknown sessions.
    async fn append(&self, key: &SessionKey, event: SessionEvent) -> Result<(), HelmError>;

    /// Set one entry of the session's state bag.
    async fn set_state(
        &self,
        key: &SessionKey,
        name: &str,
        value: serde_json::Value,
    ) -> Result<(), HelmError>;

    /// Remove a session. Returns whether it existed.
    async fn delete(&self, key: &SessionKey) -> Result<bool, HelmError>;

    /// Keys of every session owned by `user_id` within `app_name`.
    async fn list_sessions(&self, app_name: &str, user_id: &str)
        -> Result<Vec<SessionKey>, HelmError>;
}
