// src/config/file.rs
// File-based configuration from ~/.taskpilot/config.toml

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Top-level config structure
#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct TaskpilotConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
}

/// `[llm]` section
#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct LlmConfig {
    pub model: Option<String>,
    /// OpenAI-compatible chat-completions endpoint
    pub api_url: Option<String>,
}

/// `[assistant]` section
#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct AssistantConfig {
    pub name: Option<String>,
    /// Language the assistant answers in
    pub language: Option<String>,
}

impl TaskpilotConfig {
    /// Load config from ~/.taskpilot/config.toml
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load config from a path; a missing or invalid file yields defaults
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    debug!(path = %path.display(), "Loaded config from file");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to parse config file");
                    Self::default()
                }
            },
            Err(_) => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                Self::default()
            }
        }
    }

    fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".taskpilot")
            .join("config.toml")
    }
}
