// src/tasks/mod.rs

//! Task entity, storage and the completion rule tying a task to its subtasks.

pub mod model;
pub mod service;
pub mod store;

pub use model::{DEFAULT_CATEGORY, Task, TaskId};
pub use service::TaskService;
pub use store::TaskStore;
