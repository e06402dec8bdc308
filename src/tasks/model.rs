// src/tasks/model.rs
// Task entity and the task/subtask completion rule

use crate::enrich::{ParsedTask, Priority, Subtask, SubtaskId, TaskAnalysis, TaskBrief, TaskSnapshot};
use crate::error::{Result, TaskpilotError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub const DEFAULT_CATEGORY: &str = "General";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A user task.
///
/// When `subtasks` is non-empty, `completed` is derived: it is true exactly
/// when every subtask is completed. Every mutating method below keeps that
/// true before returning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub priority: Priority,
    pub category: String,
    pub tags: Vec<String>,
    /// Minutes
    pub estimated_time: u32,
    pub due_date: Option<DateTime<Utc>>,
    pub subtasks: Vec<Subtask>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// New pending task with defaults
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: TaskId::new(),
            title: title.into().trim().to_string(),
            description: String::new(),
            completed: false,
            priority: Priority::default(),
            category: DEFAULT_CATEGORY.to_string(),
            tags: Vec::new(),
            estimated_time: 0,
            due_date: None,
            subtasks: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Task with subtasks attached, completion already reconciled
    pub fn with_subtasks(mut self, subtasks: Vec<Subtask>) -> Self {
        self.subtasks = subtasks;
        self.reconcile_completion();
        self
    }

    /// Build a task from a parsed description.
    ///
    /// Fields are taken as given, including pre-checked subtasks; completion is
    /// then recomputed from the subtasks rather than trusted.
    pub fn from_parsed(parsed: ParsedTask) -> Self {
        let mut task = Self::new(parsed.title);
        task.description = parsed.description;
        task.priority = parsed.priority;
        task.category = match parsed.category.trim() {
            "" => DEFAULT_CATEGORY.to_string(),
            c => c.to_string(),
        };
        task.tags = parsed.tags;
        task.estimated_time = parsed.estimated_time;
        task.subtasks = parsed.subtasks;
        task.reconcile_completion();
        task
    }

    pub fn brief(&self) -> TaskBrief {
        TaskBrief::new(self.title.clone(), self.description.clone())
    }

    pub fn snapshot(&self) -> TaskSnapshot {
        TaskSnapshot {
            title: self.title.clone(),
            description: self.description.clone(),
        }
    }

    pub fn has_subtasks(&self) -> bool {
        !self.subtasks.is_empty()
    }

    /// Whether the completion rule currently holds
    pub fn is_consistent(&self) -> bool {
        !self.has_subtasks() || self.completed == self.all_subtasks_completed()
    }

    fn all_subtasks_completed(&self) -> bool {
        self.subtasks.iter().all(|s| s.completed)
    }

    /// Recompute `completed` from the subtasks. No-op for tasks without subtasks.
    pub fn reconcile_completion(&mut self) {
        if self.has_subtasks() {
            self.completed = self.all_subtasks_completed();
        }
    }

    /// Manual toggle.
    ///
    /// Only legal for a task without subtasks. Otherwise nothing changes and
    /// the error carries the task as it stands.
    pub fn toggle_completed(&mut self) -> Result<bool> {
        if self.has_subtasks() {
            return Err(TaskpilotError::InvariantViolation {
                task: Box::new(self.clone()),
            });
        }
        self.completed = !self.completed;
        self.touch();
        Ok(self.completed)
    }

    /// Flip one subtask and recompute the task's completion
    pub fn toggle_subtask(&mut self, subtask_id: SubtaskId) -> Result<bool> {
        let task_id = self.id;
        let subtask = self
            .subtasks
            .iter_mut()
            .find(|s| s.id == subtask_id)
            .ok_or(TaskpilotError::SubtaskNotFound {
                task_id,
                subtask_id,
            })?;
        subtask.completed = !subtask.completed;
        self.reconcile_completion();
        self.touch();
        Ok(self.completed)
    }

    /// Replace the checklist (e.g. with generated subtasks) and reconcile
    pub fn replace_subtasks(&mut self, subtasks: Vec<Subtask>) {
        self.subtasks = subtasks;
        self.reconcile_completion();
        self.touch();
    }

    /// Write the combined analysis onto this task and reconcile
    pub fn apply_analysis(&mut self, analysis: TaskAnalysis) {
        self.priority = analysis.priority;
        self.estimated_time = analysis.estimated_time;
        self.tags = analysis.tags;
        self.replace_subtasks(analysis.subtasks);
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
