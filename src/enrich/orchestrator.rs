// src/enrich/orchestrator.rs
// Enrichment entry points: compose, call, normalize, validate

use super::policy::{
    ChatReplyPolicy, EstimatePolicy, ParsedTaskPolicy, PriorityPolicy, ResponsePolicy,
    SubtasksPolicy, TagsPolicy,
};
use super::prompt::{self, AssistantPersona};
use super::types::{
    ChatRequest, Operation, ParsedTask, Priority, Subtask, TaskAnalysis, TaskBrief,
};
use crate::error::{Result, TaskpilotError};
use crate::llm::{CompletionClient, CompletionRequest, Message};
use futures::TryFutureExt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Runs the enrichment operations against one completion client.
///
/// Cheap to clone; holds no mutable state, so concurrent calls need no
/// coordination.
#[derive(Clone)]
pub struct Enricher {
    client: Arc<dyn CompletionClient>,
    model: String,
    persona: AssistantPersona,
}

impl Enricher {
    pub fn new(client: Arc<dyn CompletionClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            persona: AssistantPersona::default(),
        }
    }

    /// Override the chat assistant's name and answer language
    pub fn with_persona(mut self, persona: AssistantPersona) -> Self {
        self.persona = persona;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn persona(&self) -> &AssistantPersona {
        &self.persona
    }

    /// One upstream call followed by the operation's policy
    async fn run<P: ResponsePolicy>(&self, policy: P, messages: Vec<Message>) -> Result<P::Output> {
        let request = CompletionRequest::for_operation(P::OPERATION, self.model.clone(), messages);
        let start = Instant::now();
        let raw = self.client.complete(request).await;
        debug!(
            operation = %P::OPERATION,
            client = self.client.name(),
            ok = raw.is_ok(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Completion call settled"
        );
        policy.apply(raw)
    }

    /// 3-5 actionable subtasks. Malformed output or upstream failure is an error.
    pub async fn generate_subtasks(&self, brief: &TaskBrief) -> Result<Vec<Subtask>> {
        require_title(brief)?;
        let messages = prompt::subtasks_prompt(brief).into_messages();
        let subtasks = self.run(SubtasksPolicy, messages).await?;
        info!(count = subtasks.len(), "Generated subtasks");
        Ok(subtasks)
    }

    /// Always yields a priority; `medium` when the model cannot be trusted.
    pub async fn suggest_priority(&self, brief: &TaskBrief) -> Result<Priority> {
        require_title(brief)?;
        self.run(PriorityPolicy, prompt::priority_prompt(brief).into_messages())
            .await
    }

    /// Always yields minutes; 30 when the model cannot be trusted.
    pub async fn estimate_time(&self, brief: &TaskBrief, subtasks: &[Subtask]) -> Result<u32> {
        require_title(brief)?;
        self.run(
            EstimatePolicy,
            prompt::estimate_prompt(brief, subtasks).into_messages(),
        )
        .await
    }

    /// Always yields tags; empty when the model cannot be trusted.
    pub async fn auto_tag(&self, brief: &TaskBrief) -> Result<Vec<String>> {
        require_title(brief)?;
        self.run(TagsPolicy, prompt::tags_prompt(brief).into_messages())
            .await
    }

    /// Structured task from free text. Malformed output or upstream failure is an error.
    pub async fn parse_natural_language(&self, text: &str) -> Result<ParsedTask> {
        if text.trim().is_empty() {
            return Err(TaskpilotError::InvalidInput("text is required".into()));
        }
        let parsed = self
            .run(ParsedTaskPolicy, prompt::parse_prompt(text).into_messages())
            .await?;
        info!(
            title = %parsed.title,
            subtasks = parsed.subtasks.len(),
            "Parsed task from natural language"
        );
        Ok(parsed)
    }

    /// Assistant reply; fails only when the upstream call fails.
    pub async fn chat(&self, request: &ChatRequest) -> Result<String> {
        if request.message.trim().is_empty() {
            return Err(TaskpilotError::InvalidInput("message is required".into()));
        }
        let messages = prompt::chat_messages(request, &self.persona);
        self.run(ChatReplyPolicy, messages).await
    }

    /// Subtasks, priority, estimate and tags in one go.
    ///
    /// The four calls are issued concurrently and joined. The result exists only
    /// if every sub-operation succeeds; the first failure aborts the others and
    /// is reported as `TaskpilotError::Analysis`.
    pub async fn analyze_task(&self, brief: &TaskBrief) -> Result<TaskAnalysis> {
        require_title(brief)?;
        let start = Instant::now();

        let (subtasks, priority, estimated_time, tags) = tokio::try_join!(
            self.generate_subtasks(brief)
                .map_err(|e| analysis_failure(Operation::GenerateSubtasks, e)),
            self.suggest_priority(brief)
                .map_err(|e| analysis_failure(Operation::SuggestPriority, e)),
            self.estimate_time(brief, &[])
                .map_err(|e| analysis_failure(Operation::EstimateTime, e)),
            self.auto_tag(brief)
                .map_err(|e| analysis_failure(Operation::AutoTag, e)),
        )?;

        info!(
            duration_ms = start.elapsed().as_millis() as u64,
            subtasks = subtasks.len(),
            priority = %priority,
            estimated_time = estimated_time,
            tags = tags.len(),
            "Task analysis complete"
        );

        Ok(TaskAnalysis {
            subtasks,
            priority,
            estimated_time,
            tags,
        })
    }
}

fn require_title(brief: &TaskBrief) -> Result<()> {
    if brief.title.trim().is_empty() {
        return Err(TaskpilotError::InvalidInput("title is required".into()));
    }
    Ok(())
}

fn analysis_failure(operation: Operation, source: TaskpilotError) -> TaskpilotError {
    TaskpilotError::Analysis {
        operation,
        source: Box::new(source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockCompletionClient;

    fn enricher(mock: &Arc<MockCompletionClient>) -> Enricher {
        Enricher::new(mock.clone(), "test-model")
    }

    fn brief() -> TaskBrief {
        TaskBrief::new("Fix critical production outage", "API returns 500s")
    }

    #[tokio::test]
    async fn test_priority_fenced_answer() {
        let mock = Arc::new(MockCompletionClient::new());
        mock.respond(Operation::SuggestPriority, "```\nhigh\n```");

        let priority = enricher(&mock).suggest_priority(&brief()).await.unwrap();
        assert_eq!(priority, Priority::High);

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "test-model");
        assert_eq!(requests[0].max_tokens, 10);
    }

    #[tokio::test]
    async fn test_estimate_rejects_prose() {
        let mock = Arc::new(MockCompletionClient::new());
        mock.respond(Operation::EstimateTime, "about 45");
        assert_eq!(enricher(&mock).estimate_time(&brief(), &[]).await.unwrap(), 30);
    }

    #[tokio::test]
    async fn test_estimate_includes_subtasks_in_prompt() {
        let mock = Arc::new(MockCompletionClient::new());
        mock.respond(Operation::EstimateTime, "90");
        let subtasks = vec![Subtask::new("Roll back"), Subtask::new("Postmortem")];

        let minutes = enricher(&mock).estimate_time(&brief(), &subtasks).await.unwrap();
        assert_eq!(minutes, 90);
        let user = mock.requests()[0].last_user_content().unwrap_or_default().to_string();
        assert!(user.contains("Subtasks: Roll back, Postmortem"));
    }

    #[tokio::test]
    async fn test_tags_never_fail() {
        let mock = Arc::new(MockCompletionClient::new());
        mock.fail(Operation::AutoTag, "503 Service Unavailable");
        assert!(enricher(&mock).auto_tag(&brief()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_subtasks_upstream_failure_surfaces() {
        let mock = Arc::new(MockCompletionClient::new());
        mock.fail(Operation::GenerateSubtasks, "connection refused");
        let err = enricher(&mock).generate_subtasks(&brief()).await.unwrap_err();
        assert!(matches!(err, TaskpilotError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_blank_title_rejected_before_call() {
        let mock = Arc::new(MockCompletionClient::new());
        let err = enricher(&mock)
            .suggest_priority(&TaskBrief::new("  ", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, TaskpilotError::InvalidInput(_)));
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_chat_uses_persona_and_settings() {
        let mock = Arc::new(MockCompletionClient::new());
        mock.respond(Operation::Chat, "Start with the smallest subtask.");
        let enricher = enricher(&mock).with_persona(AssistantPersona {
            name: "Planner".into(),
            language: "Spanish".into(),
        });

        let reply = enricher
            .chat(&ChatRequest::new("Where do I start?").with_user_name("Ana"))
            .await
            .unwrap();
        assert_eq!(reply, "Start with the smallest subtask.");

        let request = &mock.requests()[0];
        assert!(request.messages[0].content.contains("called Planner"));
        assert!(request.messages[0].content.contains("answer in Spanish"));
        assert_eq!(request.max_tokens, 500);
    }

    #[tokio::test]
    async fn test_analyze_wraps_failing_operation() {
        let mock = Arc::new(MockCompletionClient::new());
        mock.respond(Operation::GenerateSubtasks, "not json at all");
        mock.respond(Operation::SuggestPriority, "low");
        mock.respond(Operation::EstimateTime, "15");
        mock.respond(Operation::AutoTag, "[\"ops\"]");

        let err = enricher(&mock).analyze_task(&brief()).await.unwrap_err();
        match err {
            TaskpilotError::Analysis { operation, source } => {
                assert_eq!(operation, Operation::GenerateSubtasks);
                assert!(matches!(*source, TaskpilotError::MalformedResponse { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
