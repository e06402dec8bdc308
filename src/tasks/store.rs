// src/tasks/store.rs
// In-memory task store with atomic per-task mutation

use super::model::{Task, TaskId};
use crate::error::{Result, TaskpilotError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// Task storage.
///
/// Each task sits behind its own lock, so read-modify-write on one task is
/// serialized while different tasks never wait on each other.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: RwLock<HashMap<TaskId, Arc<Mutex<Task>>>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a task, replacing any task with the same id
    pub async fn insert(&self, task: Task) -> Task {
        let id = task.id;
        self.tasks
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(task.clone())));
        debug!(task_id = %id, "Stored task");
        task
    }

    pub async fn get(&self, id: TaskId) -> Result<Task> {
        let entry = self.entry(id).await?;
        let task = entry.lock().await;
        Ok(task.clone())
    }

    pub async fn list(&self) -> Vec<Task> {
        let entries: Vec<_> = self.tasks.read().await.values().cloned().collect();
        let mut tasks = Vec::with_capacity(entries.len());
        for entry in entries {
            tasks.push(entry.lock().await.clone());
        }
        tasks.sort_by_key(|t| t.created_at);
        tasks
    }

    pub async fn remove(&self, id: TaskId) -> Result<Task> {
        let entry = self
            .tasks
            .write()
            .await
            .remove(&id)
            .ok_or(TaskpilotError::TaskNotFound(id))?;
        let task = entry.lock().await;
        Ok(task.clone())
    }

    /// Mutate one task atomically.
    ///
    /// The closure runs on a copy while the task's lock is held. The copy is
    /// committed only when the closure succeeds, so a rejected mutation leaves
    /// the stored task untouched. Returns the committed task and the closure's
    /// value.
    pub async fn update<T, F>(&self, id: TaskId, mutate: F) -> Result<(Task, T)>
    where
        F: FnOnce(&mut Task) -> Result<T>,
    {
        let entry = self.entry(id).await?;
        let mut stored = entry.lock().await;
        let mut draft = stored.clone();
        let value = mutate(&mut draft)?;
        *stored = draft;
        Ok((stored.clone(), value))
    }

    async fn entry(&self, id: TaskId) -> Result<Arc<Mutex<Task>>> {
        self.tasks
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(TaskpilotError::TaskNotFound(id))
    }
}
