//! Turn runner: drives one user request from input to a terminal event.

use std::sync::Arc;

use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::agent::Agent;
use crate::config::HelmConfig;
use crate::error::HelmError;
use crate::provider::{self, ModelProvider, ProviderRequest, ProviderResponse};
use crate::session::{SessionEvent, SessionKey, SessionStore};
use crate::tools::{ToolExecutionContext, ToolOutcome};
use crate::types::AgentToolCall;

use super::events::TurnEvent;

/// Tool rounds allowed per turn unless configured otherwise.
pub const DEFAULT_MAX_ROUND_TRIPS: usize = 20;

/// Per-runner limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Maximum number of tool rounds in one turn. A model that asks for
    /// another round once this many have run ends the turn with a
    /// `LOOP_LIMIT_EXCEEDED` escalation.
    pub max_round_trips: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_round_trips: DEFAULT_MAX_ROUND_TRIPS,
        }
    }
}

/// Where a turn currently is.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnState {
    AwaitingModelDecision,
    ToolDispatch(Vec<AgentToolCall>),
    Terminal,
}

/// Runs turns of one agent against a session store.
///
/// The runner itself holds no per-turn state; every call to [`Runner::run`]
/// starts an independent turn, so one runner can serve many sessions.
#[derive(Clone)]
pub struct Runner {
    app_name: String,
    agent: Arc<Agent>,
    sessions: Arc<dyn SessionStore>,
    provider: Arc<dyn ModelProvider>,
    config: RunConfig,
}

impl Runner {
    pub fn new(
        app_name: impl Into<String>,
        agent: Arc<Agent>,
        sessions: Arc<dyn SessionStore>,
        provider: Arc<dyn ModelProvider>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            agent,
            sessions,
            provider,
            config: RunConfig::default(),
        }
    }

    /// Build a runner whose provider is resolved from the agent's model.
    pub fn from_config(
        agent: Arc<Agent>,
        sessions: Arc<dyn SessionStore>,
        config: &HelmConfig,
    ) -> Result<Self, HelmError> {
        let provider: Arc<dyn ModelProvider> =
            Arc::from(provider::create_provider(agent.model(), config)?);
        Ok(Self::new(config.app_name(), agent, sessions, provider).with_config(config.run_config()))
    }

    pub fn with_config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn agent(&self) -> &Arc<Agent> {
        &self.agent
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    pub fn config(&self) -> RunConfig {
        self.config
    }

    /// Key of the session a turn for `user_id`/`session_id` runs in.
    pub fn session_key(&self, user_id: &str, session_id: &str) -> SessionKey {
        SessionKey::new(self.app_name.clone(), user_id, session_id)
    }

    /// Run one turn and stream its events.
    ///
    /// The stream ends right after the terminal event. Each event is already
    /// in the session history when it is yielded. Dropping the stream stops
    /// the turn; whatever was appended so far stays in the session.
    pub fn run(
        &self,
        user_id: &str,
        session_id: &str,
        input: impl Into<String>,
    ) -> BoxStream<'static, TurnEvent> {
        let turn = TurnContext {
            key: self.session_key(user_id, session_id),
            invocation_id: Uuid::new_v4(),
            agent: Arc::clone(&self.agent),
            sessions: Arc::clone(&self.sessions),
            provider: Arc::clone(&self.provider),
        };
        let max_round_trips = self.config.max_round_trips;
        let input = input.into();

        let stream = async_stream::stream! {
            info!(
                session = %turn.key,
                invocation_id = %turn.invocation_id,
                agent = turn.agent.name(),
                "turn started"
            );

            if let Err(err) = turn.begin(input).await {
                yield turn.escalate(err).await;
                return;
            }

            let mut state = TurnState::AwaitingModelDecision;
            let mut round_trips = 0usize;

            'turn: loop {
                match std::mem::replace(&mut state, TurnState::Terminal) {
                    TurnState::AwaitingModelDecision => {
                        let response = match turn.decide().await {
                            Ok(response) => response,
                            Err(err) => {
                                yield turn.escalate(err).await;
                                break 'turn;
                            }
                        };

                        if !response.wants_tools() {
                            if response.text.trim().is_empty() {
                                let provider = turn.provider.provider_name().to_string();
                                yield turn.escalate(HelmError::EmptyResponse(provider)).await;
                                break 'turn;
                            }
                            debug!(invocation_id = %turn.invocation_id, "model answered");
                            let event = TurnEvent::final_response(response.text);
                            match turn.record(event).await {
                                Ok(event) => {
                                    yield event;
                                }
                                Err(err) => {
                                    yield turn.escalate(err).await;
                                }
                            }
                            break 'turn;
                        }

                        if round_trips >= max_round_trips {
                            warn!(
                                invocation_id = %turn.invocation_id,
                                max_round_trips,
                                "tool loop limit reached"
                            );
                            yield turn.escalate(HelmError::LoopLimitExceeded { max_round_trips }).await;
                            break 'turn;
                        }
                        round_trips += 1;
                        debug!(
                            invocation_id = %turn.invocation_id,
                            round_trips,
                            calls = response.tool_calls.len(),
                            "dispatching tool calls"
                        );
                        state = TurnState::ToolDispatch(response.tool_calls);
                    }
                    TurnState::ToolDispatch(calls) => {
                        for call in calls {
                            let requested = TurnEvent::ToolCall {
                                call_id: call.id.clone(),
                                tool_name: call.name.clone(),
                                arguments: call.arguments.clone(),
                            };
                            match turn.record(requested).await {
                                Ok(event) => {
                                    yield event;
                                }
                                Err(err) => {
                                    yield turn.escalate(err).await;
                                    break 'turn;
                                }
                            }

                            let result = TurnEvent::ToolResult {
                                result: turn.dispatch(&call).await,
                                call_id: call.id,
                                tool_name: call.name,
                            };
                            match turn.record(result).await {
                                Ok(event) => {
                                    yield event;
                                }
                                Err(err) => {
                                    yield turn.escalate(err).await;
                                    break 'turn;
                                }
                            }
                        }
                        state = TurnState::AwaitingModelDecision;
                    }
                    TurnState::Terminal => break 'turn,
                }
            }

            info!(invocation_id = %turn.invocation_id, round_trips, "turn finished");
        };

        Box::pin(stream)
    }
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("app_name", &self.app_name)
            .field("agent", &self.agent.name())
            .field("provider", &self.provider.provider_name())
            .field("config", &self.config)
            .finish()
    }
}

/// Everything a single in-flight turn owns.
struct TurnContext {
    key: SessionKey,
    invocation_id: Uuid,
    agent: Arc<Agent>,
    sessions: Arc<dyn SessionStore>,
    provider: Arc<dyn ModelProvider>,
}

impl TurnContext {
    /// Make sure the session exists and record the user's input.
    async fn begin(&self, input: String) -> Result<(), HelmError> {
        self.sessions.get_or_create(&self.key).await?;
        self.sessions
            .append(&self.key, SessionEvent::user_message(self.invocation_id, input))
            .await
    }

    /// Ask the model what to do next, given the full session history.
    async fn decide(&self) -> Result<ProviderResponse, HelmError> {
        let session = self.sessions.get_or_create(&self.key).await?;

        let mut messages = Vec::with_capacity(session.events.len() + 1);
        messages.extend(self.agent.system_message());
        messages.extend(session.history());

        let tools = self.agent.tools();
        let request = ProviderRequest {
            messages,
            settings: self.agent.settings().clone(),
            tools: (!tools.is_empty()).then(|| tools.definitions()),
        };

        debug!(
            provider = self.provider.provider_name(),
            model = self.provider.model_id(),
            messages = request.messages.len(),
            "requesting model decision"
        );
        self.provider.generate_text(&request).await
    }

    /// Run one tool call. Failures become error outcomes the model can read.
    async fn dispatch(&self, call: &AgentToolCall) -> ToolOutcome {
        let ctx = ToolExecutionContext {
            tool_call_id: Some(call.id.clone()),
            tool_name: Some(call.name.clone()),
            invocation_id: Some(self.invocation_id),
        };
        match self
            .agent
            .tools()
            .dispatch(&call.name, &call.arguments, &ctx)
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(
                    tool = %call.name,
                    code = %err.code(),
                    error = %err,
                    "tool call failed; returning error outcome to model"
                );
                ToolOutcome::error(err.to_string())
            }
        }
    }

    /// Append `event` to the session, handing it back for yielding.
    async fn record(&self, event: TurnEvent) -> Result<TurnEvent, HelmError> {
        self.sessions
            .append(
                &self.key,
                SessionEvent::turn(self.invocation_id, self.agent.name(), event.clone()),
            )
            .await?;
        Ok(event)
    }

    /// Terminal escalation for `err`. Recorded when the session accepts it.
    async fn escalate(&self, err: HelmError) -> TurnEvent {
        let event = TurnEvent::escalation(err.escalation_code(), err.to_string());
        warn!(
            invocation_id = %self.invocation_id,
            code = %err.code(),
            error = %err,
            "turn escalated"
        );
        match self.record(event.clone()).await {
            Ok(event) => event,
            Err(record_err) => {
                warn!(error = %record_err, "escalation could not be recorded");
                event
            }
        }
    }
}
