// src/error.rs
// Standardized error types for Taskpilot

use crate::enrich::{Operation, SubtaskId};
use crate::tasks::{Task, TaskId};
use thiserror::Error;

/// Main error type for the Taskpilot library
#[derive(Error, Debug)]
pub enum TaskpilotError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The completion call itself failed (network, HTTP status, empty answer)
    #[error("enrichment failed: upstream error: {0}")]
    Upstream(String),

    /// The model answered, but not in the shape the operation requires
    #[error("enrichment failed: malformed {operation} response: {reason}")]
    MalformedResponse { operation: Operation, reason: String },

    /// One sub-operation of the combined analysis failed
    #[error("task analysis failed in {operation}: {source}")]
    Analysis {
        operation: Operation,
        #[source]
        source: Box<TaskpilotError>,
    },

    /// Manual completion toggle attempted on a task that has subtasks
    #[error(
        "task {} has {} subtasks; complete the subtasks instead of toggling the task",
        .task.id,
        .task.subtasks.len()
    )]
    InvariantViolation { task: Box<Task> },

    #[error("task {0} not found")]
    TaskNotFound(TaskId),

    #[error("subtask {subtask_id} not found in task {task_id}")]
    SubtaskNotFound { task_id: TaskId, subtask_id: SubtaskId },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Result using TaskpilotError
pub type Result<T> = std::result::Result<T, TaskpilotError>;

impl TaskpilotError {
    /// The unchanged task attached to a rejected manual toggle
    pub fn rejected_task(&self) -> Option<&Task> {
        match self {
            Self::InvariantViolation { task } => Some(&**task),
            _ => None,
        }
    }

    /// Whether the failure came from the model or its transport, as opposed to caller input
    pub fn is_enrichment_failure(&self) -> bool {
        matches!(
            self,
            Self::Upstream(_) | Self::MalformedResponse { .. } | Self::Analysis { .. }
        )
    }
}
