//! OpenAI Chat Completions API provider.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::HelmError;
use crate::models::openai::OpenAiModel;
use crate::types::*;

use super::http::{bearer_headers, post_json};
use super::{ModelProvider, ProviderRequest, ProviderResponse};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiProvider {
    model: OpenAiModel,
    api_key: String,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(model: OpenAiModel, api_key: String, base_url: Option<String>) -> Self {
        Self {
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model,
            api_key,
        }
    }

    fn build_request_body(&self, request: &ProviderRequest) -> serde_json::Value {
        let messages: Vec<serde_json::Value> =
            request.messages.iter().flat_map(message_to_openai).collect();

        let mut body = serde_json::Map::new();
        body.insert("model".into(), self.model.as_str().into());
        body.insert("messages".into(), messages.into());

        if let Some(max) = request.settings.max_tokens {
            body.insert("max_tokens".into(), max.into());
        }
        if let Some(temp) = request.settings.temperature {
            body.insert("temperature".into(), temp.into());
        }
        if let Some(top_p) = request.settings.top_p {
            body.insert("top_p".into(), top_p.into());
        }
        if let Some(ref stops) = request.settings.stop_sequences {
            body.insert("stop".into(), serde_json::json!(stops));
        }
        if let Some(seed) = request.settings.seed {
            body.insert("seed".into(), seed.into());
        }

        if let Some(ref tools) = request.tools {
            if !tools.is_empty() {
                let tool_defs: Vec<serde_json::Value> = tools
                    .iter()
                    .map(|t| {
                        serde_json::json!({
                            "type": "function",
                            "function": {
                                "name": t.name,
                                "description": t.description,
                                "parameters": t.parameters,
                            }
                        })
                    })
                    .collect();
                body.insert("tools".into(), tool_defs.into());
            }
        }

        serde_json::Value::Object(body)
    }
}

#[async_trait]
impl ModelProvider for OpenAiProvider {
    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_id(&self) -> &str {
        self.model.as_str()
    }

    async fn generate_text(&self, request: &ProviderRequest) -> Result<ProviderResponse, HelmError> {
        let body = self.build_request_body(request);
        let url = format!("{}/chat/completions", self.base_url);

        debug!(model = self.model.as_str(), "OpenAI generate_text");

        let data: OpenAiChatResponse = post_json(&url, bearer_headers(&self.api_key), &body).await?;
        let choice = data
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| HelmError::api(200, "No choices in OpenAI response"))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| AgentToolCall {
                id: tc.id,
                name: tc.function.name,
                arguments: parse_arguments(tc.function.arguments),
            })
            .collect();

        let finish_reason = choice.finish_reason.as_deref().and_then(parse_finish_reason);

        Ok(ProviderResponse {
            text: choice.message.content.unwrap_or_default(),
            usage: data
                .usage
                .map(|u| Usage {
                    input_tokens: u.prompt_tokens,
                    output_tokens: u.completion_tokens,
                    total_tokens: u.total_tokens,
                })
                .unwrap_or_default(),
            tool_calls,
            finish_reason,
        })
    }
}

fn parse_finish_reason(s: &str) -> Option<FinishReason> {
    match s {
        "stop" => Some(FinishReason::Stop),
        "length" => Some(FinishReason::Length),
        "tool_calls" => Some(FinishReason::ToolCalls),
        "content_filter" => Some(FinishReason::ContentFilter),
        _ => None,
    }
}

/// Tool-call arguments arrive as a JSON string. An empty string means no
/// arguments; text that is not JSON is kept verbatim for validation to reject.
fn parse_arguments(raw: String) -> serde_json::Value {
    if raw.trim().is_empty() {
        return serde_json::json!({});
    }
    serde_json::from_str(&raw).unwrap_or(serde_json::Value::String(raw))
}

/// One model message may expand to several wire messages: each tool result
/// is its own `role: tool` entry.
fn message_to_openai(msg: &ModelMessage) -> Vec<serde_json::Value> {
    match msg.role {
        Role::System => vec![serde_json::json!({"role": "system", "content": msg.text()})],
        Role::User => vec![serde_json::json!({"role": "user", "content": msg.text()})],
        Role::Assistant => {
            let calls = msg.tool_calls();
            let text = msg.text();
            if calls.is_empty() {
                return vec![serde_json::json!({"role": "assistant", "content": text})];
            }
            let tc_json: Vec<serde_json::Value> = calls
                .iter()
                .map(|tc| {
                    serde_json::json!({
                        "id": tc.id,
                        "type": "function",
                        "function": {
                            "name": tc.name,
                            "arguments": tc.arguments.to_string(),
                        }
                    })
                })
                .collect();
            vec![serde_json::json!({
                "role": "assistant",
                "content": if text.is_empty() { serde_json::Value::Null } else { serde_json::Value::String(text) },
                "tool_calls": tc_json,
            })]
        }
        Role::Tool => msg
            .tool_results()
            .into_iter()
            .map(|tr| {
                serde_json::json!({
                    "role": "tool",
                    "tool_call_id": tr.tool_call_id,
                    "content": tr.result.to_string(),
                })
            })
            .collect(),
    }
}

// OpenAI API response types (internal)

#[derive(Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAiToolCall>>,
}

#[derive(Deserialize)]
struct OpenAiToolCall {
    id: String,
    function: OpenAiFunction,
}

#[derive(Deserialize)]
struct OpenAiFunction {
    name: String,
    arguments: String,
}

#[derive(Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
