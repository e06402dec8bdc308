// src/testing/mod.rs
// Test doubles for running enrichment without API costs

pub mod mock_llm;

pub use mock_llm::MockCompletionClient;
