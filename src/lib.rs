// src/lib.rs
// Taskpilot - AI task enrichment and task/subtask completion consistency

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod config;
pub mod enrich;
pub mod error;
pub mod llm;
pub mod tasks;
pub mod testing;

pub use enrich::Enricher;
pub use error::{Result, TaskpilotError};
pub use tasks::{Task, TaskId, TaskService, TaskStore};
