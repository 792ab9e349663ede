//! Process-local session store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use super::{Session, SessionEvent, SessionKey, SessionStore};
use crate::error::HelmError;

/// Keeps sessions in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionKey, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_or_create(&self, key: &SessionKey) -> Result<Session, HelmError> {
        if let Some(session) = self.sessions.read().await.get(key) {
            return Ok(session.clone());
        }
        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(key.clone()).or_insert_with(|| {
            debug!(session = %key, "created session");
            Session::new(key.clone())
        });
        Ok(session.clone())
    }

    async fn get(&self, key: &SessionKey) -> Result<Option<Session>, HelmError> {
        Ok(self.sessions.read().await.get(key).cloned())
    }

    async fn append(&self, key: &SessionKey, event: SessionEvent) -> Result<(), HelmError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(key)
            .ok_or_else(|| HelmError::SessionNotFound(key.to_string()))?;
        session.updated_at = Utc::now();
        session.events.push(event);
        Ok(())
    }

    async fn set_state(
        &self,
        key: &SessionKey,
        name: &str,
        value: serde_json::Value,
    ) -> Result<(), HelmError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(key)
            .ok_or_else(|| HelmError::SessionNotFound(key.to_string()))?;
        session.updated_at = Utc::now();
        session.state.insert(name.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &SessionKey) -> Result<bool, HelmError> {
        Ok(self.sessions.write().await.remove(key).is_some())
    }

    async fn list_sessions(
        &self,
        app_name: &str,
        user_id: &str,
    ) -> Result<Vec<SessionKey>, HelmError> {
        let sessions = self.sessions.read().await;
        let mut keys: Vec<SessionKey> = sessions
            .keys()
            .filter(|k| k.app_name == app_name && k.user_id == user_id)
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }
}
