// src/config/mod.rs
// Configuration: environment, config file and the resolved settings

pub mod env;
pub mod file;

pub use env::{ApiKeys, EnvConfig};
pub use file::TaskpilotConfig;

use crate::enrich::{AssistantPersona, Enricher};
use crate::llm::{CompletionClient, DisabledClient, GROQ_API_URL, GroqClient};
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Effective settings: environment over config file over defaults
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_key: Option<String>,
    pub model: String,
    pub api_url: String,
    pub persona: AssistantPersona,
}

impl Settings {
    /// Load `.env`-populated environment and ~/.taskpilot/config.toml
    pub fn load() -> Self {
        Self::resolve(EnvConfig::load(), TaskpilotConfig::load())
    }

    pub fn resolve(env: EnvConfig, file: TaskpilotConfig) -> Self {
        let defaults = AssistantPersona::default();
        Self {
            api_key: env.api_keys.groq,
            model: env
                .model
                .or(file.llm.model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_url: env
                .api_url
                .or(file.llm.api_url)
                .unwrap_or_else(|| GROQ_API_URL.to_string()),
            persona: AssistantPersona {
                name: file.assistant.name.unwrap_or(defaults.name),
                language: file.assistant.language.unwrap_or(defaults.language),
            },
        }
    }

    /// Completion client for these settings; without a key every call fails upstream
    pub fn completion_client(&self) -> Arc<dyn CompletionClient> {
        match &self.api_key {
            Some(key) => Arc::new(GroqClient::with_api_url(key.clone(), self.api_url.clone())),
            None => Arc::new(DisabledClient),
        }
    }

    pub fn enricher(&self) -> Enricher {
        let client = self.completion_client();
        info!(client = client.name(), model = %self.model, "Enrichment configured");
        Enricher::new(client, self.model.clone()).with_persona(self.persona.clone())
    }
}
