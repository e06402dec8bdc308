// src/llm/logging.rs
// Shared completion logging helpers

use super::Usage;
use crate::enrich::Operation;
use tracing::info;

/// Log usage statistics for a completion call.
pub fn log_usage(request_id: &str, client: &str, operation: Operation, usage: &Usage) {
    info!(
        request_id = %request_id,
        operation = %operation,
        prompt_tokens = usage.prompt_tokens,
        completion_tokens = usage.completion_tokens,
        total_tokens = usage.total_tokens,
        "{} usage stats", client
    );
}

/// Log completion summary for a completion call.
pub fn log_completion(
    request_id: &str,
    client: &str,
    operation: Operation,
    duration_ms: u64,
    content_len: usize,
    finish_reason: Option<&str>,
) {
    info!(
        request_id = %request_id,
        operation = %operation,
        duration_ms = duration_ms,
        content_len = content_len,
        finish_reason = finish_reason.unwrap_or("unknown"),
        "{} completion finished", client
    );
}
