//! Tests for model system.

use helm::models::*;

#[test]
fn language_model_display() {
    let model = LanguageModel::OpenAi(openai::OpenAiModel::Gpt4o);
    assert_eq!(model.to_string(), "openai:gpt-4o");
}

#[test]
fn language_model_provider_name() {
    let model = LanguageModel::Anthropic(anthropic::AnthropicModel::Claude3Sonnet);
    assert_eq!(model.provider_name(), "anthropic");
    assert_eq!(model.model_id(), "claude-3-sonnet-20240229");
}

#[test]
fn default_model_is_gemini_flash() {
    let model: LanguageModel = DEFAULT_MODEL.parse().unwrap();
    assert_eq!(model, LanguageModel::Google(google::GoogleModel::Gemini20Flash));
    assert_eq!(model.to_string(), DEFAULT_MODEL);
}

#[test]
fn custom_model() {
    let model = LanguageModel::Custom {
        provider: "mycloud".to_string(),
        model_id: "my-model-v1".to_string(),
    };
    assert_eq!(model.provider_name(), "mycloud");
    assert_eq!(model.model_id(), "my-model-v1");
}

#[test]
fn model_selector_parse() {
    let model = ModelSelector::parse("openai:gpt-4o").unwrap();
    assert_eq!(model.model_id(), "gpt-4o");
    assert_eq!(model.provider_name(), "openai");
}

#[test]
fn model_selector_gemini_alias() {
    let model = ModelSelector::parse("gemini:gemini-2.5-pro").unwrap();
    assert_eq!(model.provider_name(), "google");
    assert_eq!(model.model_id(), "gemini-2.5-pro");
}

#[test]
fn model_selector_keeps_unlisted_ids() {
    let model = ModelSelector::parse("google:gemini-3-flash-preview").unwrap();
    assert_eq!(model.provider_name(), "google");
    assert_eq!(model.model_id(), "gemini-3-flash-preview");
}

#[test]
fn model_selector_unknown_provider() {
    let model = ModelSelector::parse("custom:my-model").unwrap();
    assert_eq!(model.provider_name(), "custom");
    assert_eq!(model.model_id(), "my-model");
}

#[test]
fn model_selector_invalid() {
    assert!(ModelSelector::parse("no-colon").is_err());
    assert!(ModelSelector::parse("openai:").is_err());
}

#[test]
fn language_model_serde_shape() {
    let model = LanguageModel::OpenAi(openai::OpenAiModel::Gpt4oMini);
    let value = serde_json::to_value(&model).unwrap();
    assert_eq!(value["provider"], "OpenAi");
    let back: LanguageModel = serde_json::from_value(value).unwrap();
    assert_eq!(back, model);
}
