// src/tasks/service.rs
// Task mutation entry points, including AI write-back

use super::model::{Task, TaskId};
use super::store::TaskStore;
use crate::enrich::{ChatRequest, ChatTurn, Enricher, ParsedTask, Subtask, SubtaskId, TaskAnalysis, TaskSnapshot};
use crate::error::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// Completion transitions and enrichment write-back over a shared store
#[derive(Clone)]
pub struct TaskService {
    store: Arc<TaskStore>,
    enricher: Enricher,
}

impl TaskService {
    pub fn new(store: Arc<TaskStore>, enricher: Enricher) -> Self {
        Self { store, enricher }
    }

    pub fn store(&self) -> &Arc<TaskStore> {
        &self.store
    }

    pub fn enricher(&self) -> &Enricher {
        &self.enricher
    }

    /// Manual completion toggle.
    ///
    /// Rejected with `InvariantViolation` (carrying the unchanged task) when the
    /// task has subtasks.
    pub async fn toggle_complete(&self, task_id: TaskId) -> Result<Task> {
        let result = self
            .store
            .update(task_id, |task| task.toggle_completed())
            .await;
        match result {
            Ok((task, completed)) => {
                info!(task_id = %task_id, completed, "Task toggled");
                Ok(task)
            }
            Err(e) => {
                if e.rejected_task().is_some() {
                    warn!(task_id = %task_id, "Manual toggle rejected: task has subtasks");
                }
                Err(e)
            }
        }
    }

    /// Flip one subtask; the task's completion follows the subtasks
    pub async fn toggle_subtask(&self, task_id: TaskId, subtask_id: SubtaskId) -> Result<Task> {
        let (task, completed) = self
            .store
            .update(task_id, |task| task.toggle_subtask(subtask_id))
            .await?;
        info!(task_id = %task_id, subtask_id = %subtask_id, completed, "Subtask toggled");
        Ok(task)
    }

    /// Replace a task's subtasks with a generated list
    pub async fn apply_generated_subtasks(
        &self,
        task_id: TaskId,
        subtasks: Vec<Subtask>,
    ) -> Result<Task> {
        let (task, ()) = self
            .store
            .update(task_id, |task| {
                task.replace_subtasks(subtasks);
                Ok(())
            })
            .await?;
        Ok(task)
    }

    /// Insert a task built from a parsed description
    pub async fn create_from_parsed(&self, parsed: ParsedTask) -> Result<Task> {
        let task = self.store.insert(Task::from_parsed(parsed)).await;
        info!(task_id = %task.id, subtasks = task.subtasks.len(), completed = task.completed, "Created task from parsed text");
        Ok(task)
    }

    pub async fn apply_analysis(&self, task_id: TaskId, analysis: TaskAnalysis) -> Result<Task> {
        let (task, ()) = self
            .store
            .update(task_id, |task| {
                task.apply_analysis(analysis);
                Ok(())
            })
            .await?;
        Ok(task)
    }

    /// Snapshot for the chat context block; `None` when the task is unknown
    pub async fn chat_context(&self, task_id: Option<TaskId>) -> Option<TaskSnapshot> {
        let task_id = task_id?;
        match self.store.get(task_id).await {
            Ok(task) => Some(task.snapshot()),
            Err(_) => {
                warn!(task_id = %task_id, "Chat context task not found, continuing without it");
                None
            }
        }
    }

    // ========================================================================
    // Enrich and write back
    // ========================================================================

    /// Generate subtasks for a stored task and attach them
    pub async fn generate_subtasks_for(&self, task_id: TaskId) -> Result<Task> {
        let task = self.store.get(task_id).await?;
        let subtasks = self.enricher.generate_subtasks(&task.brief()).await?;
        self.apply_generated_subtasks(task_id, subtasks).await
    }

    /// Run the combined analysis on a stored task and attach the results
    pub async fn analyze(&self, task_id: TaskId) -> Result<Task> {
        let task = self.store.get(task_id).await?;
        let analysis = self.enricher.analyze_task(&task.brief()).await?;
        self.apply_analysis(task_id, analysis).await
    }

    /// Parse free text and store the resulting task
    pub async fn create_from_text(&self, text: &str) -> Result<Task> {
        let parsed = self.enricher.parse_natural_language(text).await?;
        self.create_from_parsed(parsed).await
    }

    /// Chat, optionally about a stored task
    pub async fn chat(
        &self,
        message: &str,
        history: Vec<ChatTurn>,
        task_id: Option<TaskId>,
        user_name: Option<String>,
    ) -> Result<String> {
        let mut request = ChatRequest::new(message)
            .with_history(history)
            .with_task_context(self.chat_context(task_id).await);
        request.user_display_name = user_name;
        self.enricher.chat(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::Operation;
    use crate::error::TaskpilotError;
    use crate::testing::MockCompletionClient;

    fn service(mock: &Arc<MockCompletionClient>) -> TaskService {
        TaskService::new(
            Arc::new(TaskStore::new()),
            Enricher::new(mock.clone(), "test-model"),
        )
    }

    #[tokio::test]
    async fn test_manual_toggle_rejected_leaves_store_unchanged() {
        let svc = service(&Arc::new(MockCompletionClient::new()));
        let task = svc
            .store()
            .insert(Task::new("Ship").with_subtasks(vec![Subtask::new("Build")]))
            .await;

        let err = svc.toggle_complete(task.id).await.unwrap_err();
        assert_eq!(err.rejected_task(), Some(&task));
        assert_eq!(svc.store().get(task.id).await.unwrap(), task);
    }

    #[tokio::test]
    async fn test_generate_subtasks_for_reopens_completed_task() {
        let mock = Arc::new(MockCompletionClient::new());
        mock.respond(
            Operation::GenerateSubtasks,
            r#"```json
[{"title": "Outline", "completed": false}, {"title": "Draft", "completed": false}]
```"#,
        );
        let svc = service(&mock);
        let task = svc.store().insert(Task::new("Write report")).await;
        svc.toggle_complete(task.id).await.unwrap();

        let task = svc.generate_subtasks_for(task.id).await.unwrap();
        assert_eq!(task.subtasks.len(), 2);
        assert!(!task.completed);
    }

    #[tokio::test]
    async fn test_generate_subtasks_failure_leaves_task() {
        let mock = Arc::new(MockCompletionClient::new());
        mock.respond(Operation::GenerateSubtasks, "Sure! Here are some ideas.");
        let svc = service(&mock);
        let task = svc.store().insert(Task::new("Write report")).await;

        let err = svc.generate_subtasks_for(task.id).await.unwrap_err();
        assert!(matches!(err, TaskpilotError::MalformedResponse { .. }));
        assert!(svc.store().get(task.id).await.unwrap().subtasks.is_empty());
    }

    #[tokio::test]
    async fn test_chat_context_by_id() {
        let mock = Arc::new(MockCompletionClient::new());
        mock.respond(Operation::Chat, "Start with the outline.");
        let svc = service(&mock);
        let task = svc
            .store()
            .insert(Task::new("Write report").with_description("Q3 numbers"))
            .await;

        let reply = svc
            .chat("Where do I start?", Vec::new(), Some(task.id), None)
            .await
            .unwrap();
        assert_eq!(reply, "Start with the outline.");
        let user = mock.requests()[0].last_user_content().unwrap_or_default().to_string();
        assert!(user.contains("Title: Write report"));
        assert!(user.contains("Description: Q3 numbers"));

        // Unknown id: chat proceeds without context
        svc.chat("Hi", Vec::new(), Some(TaskId::new()), None).await.unwrap();
        let user = mock.requests()[1].last_user_content().unwrap_or_default().to_string();
        assert_eq!(user, "Hi");
    }
}
