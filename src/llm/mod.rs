// src/llm/mod.rs
// Completion client adapter (Groq / OpenAI-compatible)

mod groq;
mod http_client;
mod logging;
mod openai_compat;
mod provider;
mod types;

pub use groq::{GROQ_API_URL, GroqClient};
pub use http_client::LlmHttpClient;
pub use provider::{CompletionClient, CompletionRequest, DisabledClient};
pub use types::{ChatResult, Message, Usage};
