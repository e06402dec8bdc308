// src/enrich/types.rs
// Typed inputs and results for the enrichment operations

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Enrichment operations that issue a completion call.
///
/// The combined analysis is not listed: it only fans out to four of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    GenerateSubtasks,
    SuggestPriority,
    EstimateTime,
    AutoTag,
    ParseNaturalLanguage,
    Chat,
}

/// Sampling settings sent with every completion call of an operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallSettings {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Operation {
    /// Fixed per-operation sampling policy.
    ///
    /// Single-value answers run cold with tiny budgets; compound or creative
    /// outputs get more room.
    pub fn call_settings(&self) -> CallSettings {
        let (temperature, max_tokens) = match self {
            Self::GenerateSubtasks => (0.7, 500),
            Self::SuggestPriority => (0.3, 10),
            Self::EstimateTime => (0.3, 10),
            Self::AutoTag => (0.5, 100),
            Self::ParseNaturalLanguage => (0.5, 500),
            Self::Chat => (0.7, 500),
        };
        CallSettings {
            temperature,
            max_tokens,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GenerateSubtasks => "generate_subtasks",
            Self::SuggestPriority => "suggest_priority",
            Self::EstimateTime => "estimate_time",
            Self::AutoTag => "auto_tag",
            Self::ParseNaturalLanguage => "parse_natural_language",
            Self::Chat => "chat",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Lenient serde helper: anything that is not a recognised priority becomes `Medium`
    pub(crate) fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(value
            .as_ref()
            .and_then(serde_json::Value::as_str)
            .and_then(|s| s.parse().ok())
            .unwrap_or_default())
    }
}

impl FromStr for Priority {
    type Err = String;

    /// Exact token match after trimming, case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("not a priority: {other:?}")),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable identifier of a subtask within its parent task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubtaskId(pub Uuid);

impl SubtaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubtaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubtaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A checklist item owned by a task.
///
/// Model output usually omits `id`; a fresh one is assigned on deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtask {
    #[serde(default)]
    pub id: SubtaskId,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

impl Subtask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: SubtaskId::new(),
            title: title.into().trim().to_string(),
            completed: false,
        }
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }
}

/// Speaker of a prior conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One prior turn of the assistant conversation, replayed verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Read-only projection of a task used as chat context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Title and description shared by the single-field operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskBrief {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl TaskBrief {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Input of the conversational assistant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
    #[serde(default)]
    pub task_context: Option<TaskSnapshot>,
    #[serde(default)]
    pub user_display_name: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_history(mut self, history: Vec<ChatTurn>) -> Self {
        self.history = history;
        self
    }

    pub fn with_task_context(mut self, context: Option<TaskSnapshot>) -> Self {
        self.task_context = context;
        self
    }

    pub fn with_user_name(mut self, name: impl Into<String>) -> Self {
        self.user_display_name = Some(name.into());
        self
    }
}

fn default_category() -> String {
    "General".to_string()
}

/// A complete task derived from free text by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTask {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "Priority::deserialize_lenient")]
    pub priority: Priority,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_minutes_lenient")]
    pub estimated_time: u32,
    #[serde(default, deserialize_with = "deserialize_generated_subtasks")]
    pub subtasks: Vec<Subtask>,
}

/// Subtask entry as models actually emit it: a record, or just a title.
///
/// Any `id` in model output is ignored; every entry gets a fresh `SubtaskId`
/// so ids within a task stay unique.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum GeneratedSubtask {
    Record {
        title: String,
        #[serde(default)]
        completed: bool,
    },
    Title(String),
}

impl GeneratedSubtask {
    pub(crate) fn into_subtask(self) -> Subtask {
        match self {
            Self::Record { title, completed } => Subtask::new(title).completed(completed),
            Self::Title(title) => Subtask::new(title),
        }
    }
}

fn deserialize_generated_subtasks<'de, D>(deserializer: D) -> Result<Vec<Subtask>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Vec::<GeneratedSubtask>::deserialize(deserializer)?;
    Ok(entries.into_iter().map(GeneratedSubtask::into_subtask).collect())
}

/// Minutes as the model tends to write them: integer, float or numeric string.
/// Negative or unreadable values become 0.
fn deserialize_minutes_lenient<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let minutes = match value {
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64)),
        Some(serde_json::Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    Ok(minutes
        .and_then(|m| u32::try_from(m).ok())
        .unwrap_or_default())
}

/// Result of the combined analysis, in fan-out order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAnalysis {
    pub subtasks: Vec<Subtask>,
    pub priority: Priority,
    pub estimated_time: u32,
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_from_str_is_trimmed_and_case_insensitive() {
        assert_eq!(" HIGH\n".parse::<Priority>(), Ok(Priority::High));
        assert_eq!("low".parse::<Priority>(), Ok(Priority::Low));
        assert!("urgent".parse::<Priority>().is_err());
        assert!("high priority".parse::<Priority>().is_err());
    }

    #[test]
    fn test_subtask_deserialize_assigns_id_and_defaults() {
        let subtask: Subtask = serde_json::from_str(r#"{"title": "Write tests"}"#).unwrap();
        assert_eq!(subtask.title, "Write tests");
        assert!(!subtask.completed);

        let other: Subtask = serde_json::from_str(r#"{"title": "Write tests"}"#).unwrap();
        assert_ne!(subtask.id, other.id);
    }

    #[test]
    fn test_parsed_task_subtasks_get_fresh_ids() {
        let parsed: ParsedTask = serde_json::from_value(serde_json::json!({
            "title": "Trip",
            "subtasks": [
                {"id": "6f1c2d0e-8c1b-4b7e-9a53-3f0f5d9b2a11", "title": "Flight"},
                {"id": "6f1c2d0e-8c1b-4b7e-9a53-3f0f5d9b2a11", "title": "Hotel", "completed": true},
                {"id": 7, "title": "Visa"},
                "Insurance"
            ]
        }))
        .unwrap();

        assert_eq!(parsed.subtasks.len(), 4);
        let ids: std::collections::HashSet<_> = parsed.subtasks.iter().map(|s| s.id).collect();
        assert_eq!(ids.len(), 4);
        assert!(parsed.subtasks[1].completed);
        assert_eq!(parsed.subtasks[3].title, "Insurance");
    }

    #[test]
    fn test_parsed_task_defaults() {
        let parsed: ParsedTask = serde_json::from_str(r#"{"title": "Buy milk"}"#).unwrap();
        assert_eq!(parsed.priority, Priority::Medium);
        assert_eq!(parsed.category, "General");
        assert!(parsed.tags.is_empty());
        assert_eq!(parsed.estimated_time, 0);
        assert!(parsed.subtasks.is_empty());
    }

    #[test]
    fn test_parsed_task_invalid_priority_degrades() {
        let parsed: ParsedTask =
            serde_json::from_str(r#"{"title": "x", "priority": "critical"}"#).unwrap();
        assert_eq!(parsed.priority, Priority::Medium);

        let parsed: ParsedTask =
            serde_json::from_str(r#"{"title": "x", "priority": null}"#).unwrap();
        assert_eq!(parsed.priority, Priority::Medium);

        let parsed: ParsedTask =
            serde_json::from_str(r#"{"title": "x", "priority": "High"}"#).unwrap();
        assert_eq!(parsed.priority, Priority::High);
    }

    #[test]
    fn test_parsed_task_minutes_lenient() {
        let parsed: ParsedTask =
            serde_json::from_str(r#"{"title": "x", "estimatedTime": "90"}"#).unwrap();
        assert_eq!(parsed.estimated_time, 90);

        let parsed: ParsedTask =
            serde_json::from_str(r#"{"title": "x", "estimatedTime": 29.6}"#).unwrap();
        assert_eq!(parsed.estimated_time, 30);

        let parsed: ParsedTask =
            serde_json::from_str(r#"{"title": "x", "estimatedTime": -10}"#).unwrap();
        assert_eq!(parsed.estimated_time, 0);
    }

    #[test]
    fn test_operation_settings() {
        let priority = Operation::SuggestPriority.call_settings();
        assert_eq!(priority.max_tokens, 10);
        assert!((priority.temperature - 0.3).abs() < f32::EPSILON);

        let chat = Operation::Chat.call_settings();
        assert_eq!(chat.max_tokens, 500);
        assert!(chat.temperature > priority.temperature);
    }

    #[test]
    fn test_analysis_serializes_camel_case() {
        let analysis = TaskAnalysis {
            subtasks: vec![],
            priority: Priority::High,
            estimated_time: 45,
            tags: vec!["ops".into()],
        };
        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["estimatedTime"], 45);
        assert_eq!(json["priority"], "high");
    }
}
