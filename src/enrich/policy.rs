// src/enrich/policy.rs
// Parse-then-validate policies for model output, one per operation

use super::normalize::normalize;
use super::types::{GeneratedSubtask, Operation, ParsedTask, Priority, Subtask};
use crate::error::{Result, TaskpilotError};
use serde_json::Value;
use tracing::{debug, warn};

/// Priority used when the model's answer cannot be trusted
pub const FALLBACK_PRIORITY: Priority = Priority::Medium;

/// Estimate (minutes) used when the model's answer cannot be trusted
pub const FALLBACK_MINUTES: u32 = 30;

/// How many characters of a bad payload end up in logs
const LOG_EXCERPT_CHARS: usize = 120;

/// Tagged result of one completion call, before the fallback policy applies
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseOutcome<T> {
    /// Payload matched the expected shape
    Parsed(T),
    /// Model answered, but the payload did not validate
    Malformed { reason: String, excerpt: String },
    /// The completion call itself failed
    Upstream { message: String },
}

/// Expected shape and fallback behaviour for one enrichment operation.
///
/// `evaluate` never fails: malformed model output is an expected outcome, not
/// an error. `resolve` applies the policy table and is the only place an
/// outcome turns into a caller-visible error.
pub trait ResponsePolicy {
    type Output;

    const OPERATION: Operation;

    /// Whether code fences are stripped before parsing
    const NORMALIZE: bool = true;

    /// Deserialize and validate a normalized payload
    fn parse(&self, payload: &str) -> std::result::Result<Self::Output, String>;

    /// Safe default substituted for any failure, or `None` to surface failures
    fn fallback(&self) -> Option<Self::Output> {
        None
    }

    fn evaluate(&self, raw: anyhow::Result<String>) -> ResponseOutcome<Self::Output> {
        let text = match raw {
            Ok(text) => text,
            Err(e) => {
                return ResponseOutcome::Upstream {
                    message: e.to_string(),
                };
            }
        };

        let payload = if Self::NORMALIZE {
            normalize(&text)
        } else {
            text.trim()
        };
        debug!(operation = %Self::OPERATION, payload = %payload, "Evaluating model payload");

        match self.parse(payload) {
            Ok(value) => ResponseOutcome::Parsed(value),
            Err(reason) => ResponseOutcome::Malformed {
                reason,
                excerpt: excerpt(payload),
            },
        }
    }

    fn resolve(&self, outcome: ResponseOutcome<Self::Output>) -> Result<Self::Output> {
        match outcome {
            ResponseOutcome::Parsed(value) => Ok(value),
            ResponseOutcome::Malformed { reason, excerpt } => match self.fallback() {
                Some(value) => {
                    warn!(
                        operation = %Self::OPERATION,
                        reason = %reason,
                        payload = %excerpt,
                        "Malformed model response, using fallback"
                    );
                    Ok(value)
                }
                None => Err(TaskpilotError::MalformedResponse {
                    operation: Self::OPERATION,
                    reason,
                }),
            },
            ResponseOutcome::Upstream { message } => match self.fallback() {
                Some(value) => {
                    warn!(
                        operation = %Self::OPERATION,
                        error = %message,
                        "Completion call failed, using fallback"
                    );
                    Ok(value)
                }
                None => Err(TaskpilotError::Upstream(message)),
            },
        }
    }

    /// `evaluate` then `resolve`
    fn apply(&self, raw: anyhow::Result<String>) -> Result<Self::Output> {
        self.resolve(self.evaluate(raw))
    }
}

fn excerpt(payload: &str) -> String {
    if payload.chars().count() <= LOG_EXCERPT_CHARS {
        payload.to_string()
    } else {
        let head: String = payload.chars().take(LOG_EXCERPT_CHARS).collect();
        format!("{head}...")
    }
}

fn describe_json_error(e: &serde_json::Error) -> String {
    format!("invalid JSON: {e}")
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Trim titles and drop entries whose title is blank
fn clean_subtasks(subtasks: Vec<Subtask>) -> Vec<Subtask> {
    subtasks
        .into_iter()
        .filter_map(|mut s| {
            s.title = s.title.trim().to_string();
            (!s.title.is_empty()).then_some(s)
        })
        .collect()
}

/// Trim, drop blanks and exact duplicates, keep order
fn clean_labels(labels: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for label in labels {
        let label = label.trim();
        if !label.is_empty() && !out.iter().any(|l| l == label) {
            out.push(label.to_string());
        }
    }
    out
}

/// Array of `{title, completed}`; failure is surfaced
#[derive(Debug, Clone, Copy, Default)]
pub struct SubtasksPolicy;

impl ResponsePolicy for SubtasksPolicy {
    type Output = Vec<Subtask>;

    const OPERATION: Operation = Operation::GenerateSubtasks;

    fn parse(&self, payload: &str) -> std::result::Result<Self::Output, String> {
        let value: Value = serde_json::from_str(payload).map_err(|e| describe_json_error(&e))?;
        if !value.is_array() {
            return Err(format!("expected an array, got {}", type_name(&value)));
        }
        let entries: Vec<GeneratedSubtask> =
            serde_json::from_value(value).map_err(|e| format!("invalid subtask entry: {e}"))?;

        let subtasks = entries
            .into_iter()
            .map(GeneratedSubtask::into_subtask)
            .collect();
        Ok(clean_subtasks(subtasks))
    }
}

/// One of `low|medium|high`; anything else degrades to `medium`
#[derive(Debug, Clone, Copy, Default)]
pub struct PriorityPolicy;

impl ResponsePolicy for PriorityPolicy {
    type Output = Priority;

    const OPERATION: Operation = Operation::SuggestPriority;

    fn parse(&self, payload: &str) -> std::result::Result<Self::Output, String> {
        payload.parse()
    }

    fn fallback(&self) -> Option<Self::Output> {
        Some(FALLBACK_PRIORITY)
    }
}

/// Strict non-negative integer minutes; anything else degrades to 30.
///
/// No partial extraction: `"about 45"` is rejected, not read as 45.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimatePolicy;

impl ResponsePolicy for EstimatePolicy {
    type Output = u32;

    const OPERATION: Operation = Operation::EstimateTime;

    fn parse(&self, payload: &str) -> std::result::Result<Self::Output, String> {
        let minutes: i64 = payload
            .parse()
            .map_err(|_| format!("not an integer: {payload:?}"))?;
        if minutes < 0 {
            return Err(format!("negative estimate: {minutes}"));
        }
        u32::try_from(minutes).map_err(|_| format!("estimate out of range: {minutes}"))
    }

    fn fallback(&self) -> Option<Self::Output> {
        Some(FALLBACK_MINUTES)
    }
}

/// Array of strings; anything else degrades to no tags
#[derive(Debug, Clone, Copy, Default)]
pub struct TagsPolicy;

impl ResponsePolicy for TagsPolicy {
    type Output = Vec<String>;

    const OPERATION: Operation = Operation::AutoTag;

    fn parse(&self, payload: &str) -> std::result::Result<Self::Output, String> {
        let value: Value = serde_json::from_str(payload).map_err(|e| describe_json_error(&e))?;
        let Value::Array(items) = value else {
            return Err(format!("expected an array, got {}", type_name(&value)));
        };
        // Non-string entries are skipped rather than failing the whole answer
        let labels = items.into_iter().filter_map(|item| match item {
            Value::String(s) => Some(s),
            _ => None,
        });
        Ok(clean_labels(labels))
    }

    fn fallback(&self) -> Option<Self::Output> {
        Some(Vec::new())
    }
}

/// Full structured task object; failure is surfaced
#[derive(Debug, Clone, Copy, Default)]
pub struct ParsedTaskPolicy;

impl ResponsePolicy for ParsedTaskPolicy {
    type Output = ParsedTask;

    const OPERATION: Operation = Operation::ParseNaturalLanguage;

    fn parse(&self, payload: &str) -> std::result::Result<Self::Output, String> {
        let value: Value = serde_json::from_str(payload).map_err(|e| describe_json_error(&e))?;
        if !value.is_object() {
            return Err(format!("expected an object, got {}", type_name(&value)));
        }
        let mut parsed: ParsedTask =
            serde_json::from_value(value).map_err(|e| format!("invalid task object: {e}"))?;

        parsed.title = parsed.title.trim().to_string();
        if parsed.title.is_empty() {
            return Err("task title is empty".to_string());
        }
        parsed.description = parsed.description.trim().to_string();
        parsed.category = match parsed.category.trim() {
            "" => "General".to_string(),
            category => category.to_string(),
        };
        parsed.tags = clean_labels(parsed.tags);
        parsed.subtasks = clean_subtasks(parsed.subtasks);
        Ok(parsed)
    }
}

/// Free text; only an upstream failure is an error
#[derive(Debug, Clone, Copy, Default)]
pub struct ChatReplyPolicy;

impl ResponsePolicy for ChatReplyPolicy {
    type Output = String;

    const OPERATION: Operation = Operation::Chat;

    // Replies may legitimately contain fenced code
    const NORMALIZE: bool = false;

    fn parse(&self, payload: &str) -> std::result::Result<Self::Output, String> {
        Ok(payload.to_string())
    }
}
