//! Shared test helpers and mock provider.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::StreamExt;

use helm::agent::{weather_agent, Agent};
use helm::agent_loop::{RunConfig, Runner, TurnEvent};
use helm::error::HelmError;
use helm::models::LanguageModel;
use helm::provider::{ModelProvider, ProviderRequest, ProviderResponse};
use helm::session::InMemorySessionStore;
use helm::types::*;

pub const APP_NAME: &str = "weather_tutorial_app";
pub const USER_ID: &str = "user_1";
pub const SESSION_ID: &str = "session_001";

/// A provider that replays scripted decisions and records every request.
pub struct MockProvider {
    model_id: String,
    script: Mutex<VecDeque<Result<ProviderResponse, HelmError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl MockProvider {
    pub fn new(model_id: &str) -> Self {
        Self {
            model_id: model_id.to_string(),
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a text response.
    pub fn queue_response(&self, text: &str) {
        self.script.lock().unwrap().push_back(Ok(ProviderResponse {
            text: text.to_string(),
            usage: Usage {
                input_tokens: 10,
                output_tokens: 20,
                total_tokens: 30,
            },
            tool_calls: vec![],
            finish_reason: Some(FinishReason::Stop),
        }));
    }

    /// Queue a single tool call response.
    pub fn queue_tool_call(&self, id: &str, name: &str, args: serde_json::Value) {
        self.queue_tool_calls(vec![(id, name, args)]);
    }

    /// Queue one decision carrying several tool calls.
    pub fn queue_tool_calls(&self, calls: Vec<(&str, &str, serde_json::Value)>) {
        let calls = calls
            .into_iter()
            .map(|(id, name, arguments)| AgentToolCall {
                id: id.to_string(),
                name: name.to_string(),
                arguments,
            })
            .collect();
        self.script
            .lock()
            .unwrap()
            .push_back(Ok(ProviderResponse::tool_calls(calls)));
    }

    /// Queue a provider failure.
    pub fn queue_error(&self, error: HelmError) {
        self.script.lock().unwrap().push_back(Err(error));
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn generate_text(
        &self,
        request: &ProviderRequest,
    ) -> Result<ProviderResponse, HelmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ProviderResponse::text("Mock response")))
    }
}

pub fn mock_model() -> LanguageModel {
    LanguageModel::Custom {
        provider: "mock".to_string(),
        model_id: "scripted".to_string(),
    }
}

pub fn weather_test_agent() -> Arc<Agent> {
    Arc::new(weather_agent(mock_model()))
}

/// Runner over the weather agent, a fresh in-memory store, and `provider`.
pub fn weather_runner(provider: Arc<MockProvider>) -> (Runner, Arc<InMemorySessionStore>) {
    runner_for(weather_test_agent(), provider, RunConfig::default())
}

pub fn runner_for(
    agent: Arc<Agent>,
    provider: Arc<MockProvider>,
    config: RunConfig,
) -> (Runner, Arc<InMemorySessionStore>) {
    let store = Arc::new(InMemorySessionStore::new());
    let runner = Runner::new(APP_NAME, agent, store.clone(), provider).with_config(config);
    (runner, store)
}

/// Drain a whole turn.
pub async fn collect_turn(runner: &Runner, input: &str) -> Vec<TurnEvent> {
    runner.run(USER_ID, SESSION_ID, input).collect().await
}

/// Exactly one terminal event, and it is the last one.
pub fn assert_single_terminal_last(events: &[TurnEvent]) {
    let terminal: Vec<usize> = events
        .iter()
        .enumerate()
        .filter(|(_, e)| e.is_terminal())
        .map(|(i, _)| i)
        .collect();
    assert_eq!(terminal, vec![events.len() - 1], "events: {events:#?}");
}
