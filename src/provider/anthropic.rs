//! Anthropic Messages API provider.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Deserialize;
use tracing::debug;

use crate::error::HelmError;
use crate::models::anthropic::AnthropicModel;
use crate::types::*;

use super::http::post_json;
use super::{ModelProvider, ProviderRequest, ProviderResponse};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 1024;

pub struct AnthropicProvider {
    model: AnthropicModel,
    api_key: String,
    base_url: String,
}

impl AnthropicProvider {
    pub fn new(model: AnthropicModel, api_key: String, base_url: Option<String>) -> Self {
        Self {
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model,
            api_key,
        }
    }

    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(val) = HeaderValue::from_str(&self.api_key) {
            headers.insert("x-api-key", val);
        }
        headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));
        headers
    }

    fn build_request_body(&self, request: &ProviderRequest) -> serde_json::Value {
        let mut system_parts = Vec::new();
        let mut messages: Vec<serde_json::Value> = Vec::new();

        for msg in &request.messages {
            match msg.role {
                Role::System => system_parts.push(msg.text()),
                Role::User => messages.push(serde_json::json!({
                    "role": "user",
                    "content": msg.text(),
                })),
                Role::Assistant => {
                    let mut content: Vec<serde_json::Value> = Vec::new();
                    for part in &msg.content {
                        match part {
                            ContentPart::Text { text } if !text.is_empty() => {
                                content.push(serde_json::json!({"type": "text", "text": text}));
                            }
                            ContentPart::ToolCall(tc) => content.push(serde_json::json!({
                                "type": "tool_use",
                                "id": tc.id,
                                "name": tc.name,
                                "input": tc.arguments,
                            })),
                            _ => {}
                        }
                    }
                    if !content.is_empty() {
                        messages.push(serde_json::json!({"role": "assistant", "content": content}));
                    }
                }
                Role::Tool => {
                    let blocks: Vec<serde_json::Value> = msg
                        .tool_results()
                        .into_iter()
                        .map(|tr| {
                            serde_json::json!({
                                "type": "tool_result",
                                "tool_use_id": tr.tool_call_id,
                                "content": tr.result.to_string(),
                                "is_error": tr.is_error,
                            })
                        })
                        .collect();
                    // Results answering one assistant turn share a user message.
                    let merge = messages.last().is_some_and(is_tool_result_message);
                    if merge {
                        if let Some(existing) = messages
                            .last_mut()
                            .and_then(|last| last.get_mut("content"))
                            .and_then(serde_json::Value::as_array_mut)
                        {
                            existing.extend(blocks);
                        }
                    } else {
                        messages.push(serde_json::json!({"role": "user", "content": blocks}));
                    }
                }
            }
        }

        let mut body = serde_json::Map::new();
        body.insert("model".into(), self.model.as_str().into());
        body.insert("messages".into(), messages.into());
        body.insert(
            "max_tokens".into(),
            request.settings.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS).into(),
        );
        if !system_parts.is_empty() {
            body.insert("system".into(), system_parts.join("\n\n").into());
        }
        if let Some(temp) = request.settings.temperature {
            body.insert("temperature".into(), temp.into());
        }
        if let Some(top_p) = request.settings.top_p {
            body.insert("top_p".into(), top_p.into());
        }
        if let Some(ref stops) = request.settings.stop_sequences {
            body.insert("stop_sequences".into(), serde_json::json!(stops));
        }

        if let Some(ref tools) = request.tools {
            if !tools.is_empty() {
                let defs: Vec<serde_json::Value> = tools
                    .iter()
                    .map(|t| {
                        serde_json::json!({
                            "name": t.name,
                            "description": t.description,
                            "input_schema": t.parameters,
                        })
                    })
                    .collect();
                body.insert("tools".into(), defs.into());
            }
        }

        serde_json::Value::Object(body)
    }
}

fn is_tool_result_message(message: &serde_json::Value) -> bool {
    message["role"] == "user"
        && message["content"]
            .as_array()
            .and_then(|blocks| blocks.first())
            .is_some_and(|b| b["type"] == "tool_result")
}

#[async_trait]
impl ModelProvider for AnthropicProvider {
    fn provider_name(&self) -> &str {
        "anthropic"
    }

    fn model_id(&self) -> &str {
        self.model.as_str()
    }

    async fn generate_text(&self, request: &ProviderRequest) -> Result<ProviderResponse, HelmError> {
        let body = self.build_request_body(request);
        let url = format!("{}/messages", self.base_url);

        debug!(model = self.model.as_str(), "Anthropic generate_text");

        let data: AnthropicResponse = post_json(&url, self.build_headers(), &body).await?;

        let mut text = String::new();
        let mut tool_calls = Vec::new();
        for block in data.content {
            match block.r#type.as_str() {
                "text" => {
                    if let Some(t) = block.text {
                        text.push_str(&t);
                    }
                }
                "tool_use" => {
                    if let (Some(id), Some(name)) = (block.id, block.name) {
                        tool_calls.push(AgentToolCall {
                            id,
                            name,
                            arguments: block
                                .input
                                .unwrap_or(serde_json::Value::Object(Default::default())),
                        });
                    }
                }
                _ => {}
            }
        }

        let finish_reason = match data.stop_reason.as_deref() {
            Some("end_turn") | Some("stop_sequence") => Some(FinishReason::Stop),
            Some("max_tokens") => Some(FinishReason::Length),
            Some("tool_use") => Some(FinishReason::ToolCalls),
            _ => None,
        };

        Ok(ProviderResponse {
            text,
            usage: Usage {
                input_tokens: data.usage.input_tokens,
                output_tokens: data.usage.output_tokens,
                total_tokens: data.usage.input_tokens + data.usage.output_tokens,
            },
            tool_calls,
            finish_reason,
        })
    }
}

// Internal Anthropic response types

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
    stop_reason: Option<String>,
    usage: AnthropicUsage,
}

#[derive(Deserialize)]
struct AnthropicContentBlock {
    r#type: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    input: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}
