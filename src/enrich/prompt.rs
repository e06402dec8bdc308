// src/enrich/prompt.rs
// Prompt composition for every enrichment operation

use super::types::{ChatRequest, ChatRole, Subtask, TaskBrief, TaskSnapshot};
use crate::llm::Message;

/// Placeholder sent instead of an empty description
pub const NO_DESCRIPTION: &str = "No description";

/// Name used in the chat persona when the caller supplies none
pub const DEFAULT_USER_NAME: &str = "user";

/// Identity of the conversational assistant
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantPersona {
    pub name: String,
    pub language: String,
}

impl Default for AssistantPersona {
    fn default() -> Self {
        Self {
            name: "TaskMaster AI".to_string(),
            language: "English".to_string(),
        }
    }
}

/// System and user turn for a single-shot operation
#[derive(Debug, Clone, PartialEq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

impl PromptPair {
    pub fn into_messages(self) -> Vec<Message> {
        vec![Message::system(self.system), Message::user(self.user)]
    }
}

fn description_or_placeholder(description: &str) -> &str {
    match description.trim() {
        "" => NO_DESCRIPTION,
        d => d,
    }
}

/// Shared "Title / Description" block
fn task_block(brief: &TaskBrief) -> String {
    format!(
        "Title: {}\nDescription: {}",
        brief.title.trim(),
        description_or_placeholder(&brief.description)
    )
}

pub fn subtasks_prompt(brief: &TaskBrief) -> PromptPair {
    PromptPair {
        system: "You are an expert task-management assistant. You answer only with valid JSON and no additional text.".to_string(),
        user: format!(
            r#"Generate a list of 3-5 specific, actionable subtasks for the following task:

{}

Respond ONLY with a JSON array of objects with the structure: [{{"title": "subtask", "completed": false}}]
Do not include any explanations, only the JSON."#,
            task_block(brief)
        ),
    }
}

pub fn priority_prompt(brief: &TaskBrief) -> PromptPair {
    PromptPair {
        system: "You are a task-management expert. Analyze the urgency and importance of tasks.".to_string(),
        user: format!(
            "Analyze the following task and determine its priority (low, medium, high):\n\n{}\n\nRespond ONLY with one word: low, medium or high.",
            task_block(brief)
        ),
    }
}

/// Estimate prompt; subtask titles are listed when present
pub fn estimate_prompt(brief: &TaskBrief, subtasks: &[Subtask]) -> PromptPair {
    let subtasks_text = if subtasks.is_empty() {
        String::new()
    } else {
        let titles: Vec<&str> = subtasks.iter().map(|s| s.title.as_str()).collect();
        format!("\nSubtasks: {}", titles.join(", "))
    };

    PromptPair {
        system: "You are an expert at estimating how long tasks take. Be realistic and consider complexity.".to_string(),
        user: format!(
            "Estimate the time needed to complete this task, in minutes:\n\n{}{}\n\nRespond ONLY with an integer (estimated minutes). No additional text.",
            task_block(brief),
            subtasks_text
        ),
    }
}

pub fn tags_prompt(brief: &TaskBrief) -> PromptPair {
    PromptPair {
        system: "You are an expert at categorizing tasks. Respond only with valid JSON.".to_string(),
        user: format!(
            r#"Generate 2-3 relevant tags to categorize this task:

{}

Respond ONLY with a JSON array of strings: ["tag1", "tag2"]
No additional text."#,
            task_block(brief)
        ),
    }
}

pub fn parse_prompt(natural_text: &str) -> PromptPair {
    PromptPair {
        system: "You are an expert at turning natural language into tasks. Respond only with valid JSON.".to_string(),
        user: format!(
            r#"Convert the following text into a structured task, including clear, actionable subtasks:

"{}"

Respond ONLY with a JSON object with this exact structure:
{{
  "title": "task title",
  "description": "detailed description",
  "priority": "low|medium|high",
  "category": "appropriate category",
  "tags": ["tag1", "tag2"],
  "estimatedTime": minutes_as_integer,
  "subtasks": [
    {{ "title": "subtask 1", "completed": false }},
    {{ "title": "subtask 2", "completed": false }}
  ]
}}

Important rules:
- Generate between 3 and 6 concrete subtasks in "subtasks".
- Use only one of these priorities: low, medium or high.
- "estimatedTime" must be an integer number of minutes.
- Do not include any text outside the JSON."#,
            natural_text.trim()
        ),
    }
}

/// Persona preamble for the assistant, parameterized by the caller's name
pub fn chat_system_prompt(persona: &AssistantPersona, user_name: Option<&str>) -> String {
    let user_name = user_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_USER_NAME);

    format!(
        "You are an expert productivity assistant called {name}.
You ALWAYS answer in {language}, with a friendly and professional tone.
The user's name is {user_name}; you may address them by name naturally now and then (not in every sentence).
You help organize tasks, prioritize, plan and improve productivity. Be clear, direct and practical.",
        name = persona.name,
        language = persona.language,
    )
}

/// Context block appended to the user turn, never to the system turn
fn context_block(context: &TaskSnapshot) -> String {
    format!(
        "\n\nCurrent task context:\nTitle: {}\nDescription: {}",
        context.title.trim(),
        description_or_placeholder(&context.description)
    )
}

/// Full ordered message list: persona, replayed history, current user turn
pub fn chat_messages(request: &ChatRequest, persona: &AssistantPersona) -> Vec<Message> {
    let mut messages = Vec::with_capacity(request.history.len() + 2);
    messages.push(Message::system(chat_system_prompt(
        persona,
        request.user_display_name.as_deref(),
    )));

    for turn in request
        .history
        .iter()
        .filter(|turn| !turn.content.trim().is_empty())
    {
        messages.push(match turn.role {
            ChatRole::User => Message::user(turn.content.clone()),
            ChatRole::Assistant => Message::assistant(turn.content.clone()),
        });
    }

    let mut user_turn = request.message.clone();
    if let Some(ref context) = request.task_context {
        user_turn.push_str(&context_block(context));
    }
    messages.push(Message::user(user_turn));

    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::ChatTurn;

    fn brief() -> TaskBrief {
        TaskBrief::new("Fix critical production outage", "")
    }

    #[test]
    fn test_empty_description_gets_placeholder() {
        let prompt = priority_prompt(&brief());
        assert!(prompt.user.contains("Description: No description"));
        assert!(prompt.user.contains("Title: Fix critical production outage"));

        let prompt = priority_prompt(&TaskBrief::new("t", "   "));
        assert!(prompt.user.contains("Description: No description"));
    }

    #[test]
    fn test_prompts_demand_bare_output() {
        assert!(subtasks_prompt(&brief()).user.contains(r#"[{"title": "subtask", "completed": false}]"#));
        assert!(priority_prompt(&brief()).user.contains("one word: low, medium or high"));
        assert!(estimate_prompt(&brief(), &[]).user.contains("ONLY with an integer"));
        assert!(tags_prompt(&brief()).user.contains("JSON array of strings"));
        assert!(parse_prompt("buy milk").user.contains("\"estimatedTime\": minutes_as_integer"));
    }

    #[test]
    fn test_estimate_lists_subtasks() {
        let subtasks = vec![Subtask::new("Reproduce"), Subtask::new("Patch")];
        let prompt = estimate_prompt(&brief(), &subtasks);
        assert!(prompt.user.contains("\nSubtasks: Reproduce, Patch"));

        let prompt = estimate_prompt(&brief(), &[]);
        assert!(!prompt.user.contains("Subtasks:"));
    }

    #[test]
    fn test_parse_prompt_quotes_text() {
        let prompt = parse_prompt("  call the dentist tomorrow  ");
        assert!(prompt.user.contains("\"call the dentist tomorrow\""));
    }

    #[test]
    fn test_into_messages_order() {
        let messages = tags_prompt(&brief()).into_messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
    }

    #[test]
    fn test_chat_persona_uses_name() {
        let persona = AssistantPersona::default();
        let system = chat_system_prompt(&persona, Some("Ana"));
        assert!(system.contains("TaskMaster AI"));
        assert!(system.contains("The user's name is Ana"));

        let system = chat_system_prompt(&persona, Some("  "));
        assert!(system.contains("The user's name is user"));
    }

    #[test]
    fn test_chat_messages_replay_history_and_append_context() {
        let request = ChatRequest::new("How should I start?")
            .with_history(vec![
                ChatTurn::user("Hi"),
                ChatTurn::assistant("Hello! How can I help?"),
                ChatTurn::user("   "),
            ])
            .with_task_context(Some(TaskSnapshot {
                title: "Write report".into(),
                description: String::new(),
            }))
            .with_user_name("Ana");

        let messages = chat_messages(&request, &AssistantPersona::default());
        let roles: Vec<_> = messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "user"]);

        assert!(!messages[0].content.contains("Write report"));
        let last = &messages[3].content;
        assert!(last.starts_with("How should I start?\n\nCurrent task context:"));
        assert!(last.contains("Title: Write report"));
        assert!(last.contains("Description: No description"));
    }

    #[test]
    fn test_chat_messages_without_context() {
        let messages = chat_messages(&ChatRequest::new("Hello"), &AssistantPersona::default());
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].content, "Hello");
    }
}
