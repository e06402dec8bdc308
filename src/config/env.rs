// src/config/env.rs
// Environment-based configuration: API key and endpoint overrides

use tracing::{debug, info, warn};

/// Parse a boolean flag value ("1", "true", "yes", "on" and their negations)
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// API key loaded from the environment
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// Groq API key (GROQ_API_KEY)
    pub groq: Option<String>,
}

impl ApiKeys {
    /// Set `TASKPILOT_DISABLE_LLM=1` to suppress the key (every call then
    /// fails upstream and scalar operations fall back to their defaults)
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Self {
        let disabled = lookup("TASKPILOT_DISABLE_LLM")
            .and_then(|v| parse_bool(&v))
            .unwrap_or(false);
        if disabled {
            info!("TASKPILOT_DISABLE_LLM is set, completion calls disabled");
            return Self::default();
        }

        let keys = Self {
            groq: lookup("GROQ_API_KEY").filter(|k| !k.trim().is_empty()),
        };
        if keys.groq.is_none() {
            warn!("GROQ_API_KEY not set - enrichment calls will fail or fall back");
        } else {
            debug!("Groq API key loaded");
        }
        keys
    }

    pub fn has_llm_provider(&self) -> bool {
        self.groq.is_some()
    }
}

/// Everything read from the environment (call once at startup)
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub api_keys: ApiKeys,
    /// Model override (TASKPILOT_MODEL)
    pub model: Option<String>,
    /// Endpoint override (TASKPILOT_API_URL)
    pub api_url: Option<String>,
}

impl EnvConfig {
    pub fn load() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            api_keys: ApiKeys::from_lookup(&lookup),
            model: non_empty("TASKPILOT_MODEL"),
            api_url: non_empty("TASKPILOT_API_URL"),
        }
    }
}
