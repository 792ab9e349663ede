//! Configuration system (layered: defaults < env < explicit setters).

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::warn;

use crate::agent_loop::RunConfig;
use crate::error::HelmError;
use crate::models::{LanguageModel, DEFAULT_MODEL};

/// Application name used when none is configured.
pub const DEFAULT_APP_NAME: &str = "weather_tutorial_app";

/// Layered configuration for helm.
///
/// Credentials and base URLs are keyed by provider name (`google`, `openai`,
/// `anthropic`) and shared between clones, so a config handed to several
/// runners sees later `set_api_key` calls.
#[derive(Clone)]
pub struct HelmConfig {
    api_keys: Arc<RwLock<HashMap<String, String>>>,
    base_urls: Arc<RwLock<HashMap<String, String>>>,
    default_model: String,
    app_name: String,
    max_round_trips: usize,
}

impl fmt::Debug for HelmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let providers: Vec<String> = self
            .api_keys
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        f.debug_struct("HelmConfig")
            .field("api_keys", &providers)
            .field("base_urls", &self.base_urls)
            .field("default_model", &self.default_model)
            .field("app_name", &self.app_name)
            .field("max_round_trips", &self.max_round_trips)
            .finish()
    }
}

impl Default for HelmConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl HelmConfig {
    /// Create a config holding only defaults.
    pub fn new() -> Self {
        Self {
            api_keys: Arc::new(RwLock::new(HashMap::new())),
            base_urls: Arc::new(RwLock::new(HashMap::new())),
            default_model: DEFAULT_MODEL.to_string(),
            app_name: DEFAULT_APP_NAME.to_string(),
            max_round_trips: RunConfig::default().max_round_trips,
        }
    }

    /// Load from the environment, reading `.env` first when present.
    ///
    /// Recognised variables: `GOOGLE_API_KEY`/`GEMINI_API_KEY`,
    /// `OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, `GOOGLE_BASE_URL`,
    /// `OPENAI_BASE_URL`, `ANTHROPIC_BASE_URL`, `HELM_MODEL`, `HELM_APP_NAME`
    /// and `HELM_MAX_ROUND_TRIPS`.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let mut config = Self::new();

        let env_mappings = [
            ("GOOGLE_API_KEY", "google"),
            ("GEMINI_API_KEY", "google"),
            ("OPENAI_API_KEY", "openai"),
            ("ANTHROPIC_API_KEY", "anthropic"),
        ];
        for (env_var, provider) in &env_mappings {
            if let Ok(key) = std::env::var(env_var) {
                if config.get_api_key(provider).is_none() {
                    config.set_api_key(provider, key);
                }
            }
        }

        let url_mappings = [
            ("GOOGLE_BASE_URL", "google"),
            ("OPENAI_BASE_URL", "openai"),
            ("ANTHROPIC_BASE_URL", "anthropic"),
        ];
        for (env_var, provider) in &url_mappings {
            if let Ok(url) = std::env::var(env_var) {
                config.set_base_url(provider, url);
            }
        }

        if let Ok(model) = std::env::var("HELM_MODEL") {
            config.default_model = model;
        }
        if let Ok(app_name) = std::env::var("HELM_APP_NAME") {
            config.app_name = app_name;
        }
        if let Ok(raw) = std::env::var("HELM_MAX_ROUND_TRIPS") {
            match raw.parse::<usize>() {
                Ok(n) => config.max_round_trips = n,
                Err(_) => warn!(value = %raw, "ignoring non-numeric HELM_MAX_ROUND_TRIPS"),
            }
        }

        config
    }

    pub fn set_api_key(&self, provider: &str, key: String) {
        self.api_keys
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(provider.to_string(), key);
    }

    pub fn get_api_key(&self, provider: &str) -> Option<String> {
        self.api_keys
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(provider)
            .cloned()
    }

    pub fn set_base_url(&self, provider: &str, url: String) {
        self.base_urls
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(provider.to_string(), url);
    }

    pub fn get_base_url(&self, provider: &str) -> Option<String> {
        self.base_urls
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(provider)
            .cloned()
    }

    /// Check if a provider has credentials configured.
    pub fn has_credentials(&self, provider: &str) -> bool {
        self.get_api_key(provider).is_some()
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    pub fn with_max_round_trips(mut self, max_round_trips: usize) -> Self {
        self.max_round_trips = max_round_trips;
        self
    }

    /// The configured default model, parsed.
    pub fn default_model(&self) -> Result<LanguageModel, HelmError> {
        self.default_model.parse()
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn max_round_trips(&self) -> usize {
        self.max_round_trips
    }

    /// Runner settings derived from this config.
    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            max_round_trips: self.max_round_trips,
        }
    }
}
