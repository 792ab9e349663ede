//! Google Gemini API provider.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::HelmError;
use crate::models::google::GoogleModel;
use crate::types::*;

use super::http::post_json;
use super::{ModelProvider, ProviderRequest, ProviderResponse};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GoogleProvider {
    model: GoogleModel,
    api_key: String,
    base_url: String,
}

impl GoogleProvider {
    pub fn new(model: GoogleModel, api_key: String, base_url: Option<String>) -> Self {
        Self {
            model,
            api_key,
            base_url: base_url.unwrap_or_else(|| BASE_URL.to_string()),
        }
    }

    fn build_request_body(&self, request: &ProviderRequest) -> serde_json::Value {
        let mut system_instruction = None;
        let mut contents: Vec<serde_json::Value> = Vec::new();

        for msg in &request.messages {
            match msg.role {
                Role::System => {
                    system_instruction = Some(serde_json::json!({
                        "parts": [{"text": msg.text()}]
                    }));
                }
                Role::User => {
                    contents.push(serde_json::json!({
                        "role": "user",
                        "parts": [{"text": msg.text()}],
                    }));
                }
                Role::Assistant => {
                    let mut parts = Vec::new();
                    let text = msg.text();
                    if !text.is_empty() {
                        parts.push(serde_json::json!({"text": text}));
                    }
                    for call in msg.tool_calls() {
                        parts.push(serde_json::json!({
                            "functionCall": {"name": call.name, "args": call.arguments}
                        }));
                    }
                    contents.push(serde_json::json!({"role": "model", "parts": parts}));
                }
                Role::Tool => {
                    let parts: Vec<serde_json::Value> = msg
                        .tool_results()
                        .into_iter()
                        .map(|tr| {
                            serde_json::json!({
                                "functionResponse": {
                                    "name": tr.tool_name,
                                    "response": tr.result,
                                }
                            })
                        })
                        .collect();
                    // Consecutive function responses belong to one user turn.
                    if contents.last().is_some_and(is_function_response_turn) {
                        if let Some(existing) = contents
                            .last_mut()
                            .and_then(|last| last.get_mut("parts"))
                            .and_then(serde_json::Value::as_array_mut)
                        {
                            existing.extend(parts);
                        }
                    } else {
                        contents.push(serde_json::json!({"role": "user", "parts": parts}));
                    }
                }
            }
        }

        let mut body = serde_json::Map::new();
        body.insert("contents".into(), contents.into());

        if let Some(sys) = system_instruction {
            body.insert("systemInstruction".into(), sys);
        }

        let mut gen_config = serde_json::Map::new();
        if let Some(max) = request.settings.max_tokens {
            gen_config.insert("maxOutputTokens".into(), max.into());
        }
        if let Some(temp) = request.settings.temperature {
            gen_config.insert("temperature".into(), temp.into());
        }
        if let Some(top_p) = request.settings.top_p {
            gen_config.insert("topP".into(), top_p.into());
        }
        if let Some(ref stops) = request.settings.stop_sequences {
            gen_config.insert("stopSequences".into(), serde_json::json!(stops));
        }
        if let Some(seed) = request.settings.seed {
            gen_config.insert("seed".into(), seed.into());
        }
        if !gen_config.is_empty() {
            body.insert("generationConfig".into(), serde_json::Value::Object(gen_config));
        }

        if let Some(ref tools) = request.tools {
            if !tools.is_empty() {
                let fn_decls: Vec<serde_json::Value> = tools
                    .iter()
                    .map(|t| {
                        serde_json::json!({
                            "name": t.name,
                            "description": t.description,
                            "parameters": t.parameters,
                        })
                    })
                    .collect();
                body.insert(
                    "tools".into(),
                    serde_json::json!([{"functionDeclarations": fn_decls}]),
                );
            }
        }

        serde_json::Value::Object(body)
    }
}

fn is_function_response_turn(content: &serde_json::Value) -> bool {
    content["role"] == "user"
        && content["parts"]
            .as_array()
            .and_then(|parts| parts.first())
            .is_some_and(|p| p.get("functionResponse").is_some())
}

#[async_trait]
impl ModelProvider for GoogleProvider {
    fn provider_name(&self) -> &str {
        "google"
    }

    fn model_id(&self) -> &str {
        self.model.as_str()
    }

    async fn generate_text(&self, request: &ProviderRequest) -> Result<ProviderResponse, HelmError> {
        let body = self.build_request_body(request);
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url,
            self.model.as_str(),
            self.api_key
        );

        debug!(model = self.model.as_str(), "Google generate_text");

        let headers = reqwest::header::HeaderMap::new();
        let data: GeminiResponse = post_json(&url, headers, &body).await?;

        let candidate = data
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| HelmError::api(200, "No candidates in Gemini response"))?;

        let mut text = String::new();
        let mut tool_calls = Vec::new();

        for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
            if let Some(t) = part.text {
                text.push_str(&t);
            }
            if let Some(fc) = part.function_call {
                tool_calls.push(AgentToolCall {
                    id: uuid::Uuid::new_v4().to_string(),
                    name: fc.name,
                    arguments: fc
                        .args
                        .unwrap_or(serde_json::Value::Object(Default::default())),
                });
            }
        }

        let finish_reason = if !tool_calls.is_empty() {
            Some(FinishReason::ToolCalls)
        } else {
            match candidate.finish_reason.as_deref() {
                Some("STOP") => Some(FinishReason::Stop),
                Some("MAX_TOKENS") => Some(FinishReason::Length),
                Some("SAFETY") => Some(FinishReason::ContentFilter),
                _ => None,
            }
        };

        let usage = data
            .usage_metadata
            .map(|u| Usage {
                input_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
                total_tokens: u.total_token_count,
            })
            .unwrap_or_default();

        Ok(ProviderResponse {
            text,
            usage,
            tool_calls,
            finish_reason,
        })
    }
}

// Internal Gemini response types

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    text: Option<String>,
    function_call: Option<GeminiFunctionCall>,
}

#[derive(Deserialize)]
struct GeminiFunctionCall {
    name: String,
    args: Option<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ToolDefinition;

    fn provider() -> GoogleProvider {
        GoogleProvider::new(GoogleModel::Gemini20Flash, "key".into(), None)
    }

    #[test]
    fn body_carries_system_instruction_and_tools() {
        let request = ProviderRequest {
            messages: vec![ModelMessage::system("be nice"), ModelMessage::user("hi")],
            settings: GenerationSettings::default(),
            tools: Some(vec![ToolDefinition {
                name: "get_weather".into(),
                description: "weather".into(),
                parameters: serde_json::json!({"type": "object"}),
            }]),
        };
        let body = provider().build_request_body(&request);
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be nice");
        assert_eq!(body["contents"].as_array().unwrap().len(), 1);
        assert_eq!(
            body["tools"][0]["functionDeclarations"][0]["name"],
            "get_weather"
        );
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn tool_round_trip_maps_to_function_call_and_response() {
        let call = AgentToolCall {
            id: "c1".into(),
            name: "get_weather".into(),
            arguments: serde_json::json!({"city": "Tokyo"}),
        };
        let request = ProviderRequest {
            messages: vec![
                ModelMessage::user("weather?"),
                ModelMessage::assistant_tool_calls(vec![call]),
                ModelMessage::tool_result("c1", "get_weather", serde_json::json!({"status": "success"}), false),
            ],
            settings: GenerationSettings::default(),
            tools: None,
        };
        let body = provider().build_request_body(&request);
        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[1]["parts"][0]["functionCall"]["args"]["city"], "Tokyo");
        assert_eq!(contents[2]["role"], "user");
        assert_eq!(
            contents[2]["parts"][0]["functionResponse"]["name"],
            "get_weather"
        );
    }
}
