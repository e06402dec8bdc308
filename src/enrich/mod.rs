// src/enrich/mod.rs
// AI enrichment: prompt, call, normalize, validate, fall back

pub mod normalize;
pub mod orchestrator;
pub mod policy;
pub mod prompt;
pub mod types;

pub use normalize::normalize;
pub use orchestrator::Enricher;
pub use policy::{
    ChatReplyPolicy, EstimatePolicy, FALLBACK_MINUTES, FALLBACK_PRIORITY, ParsedTaskPolicy,
    PriorityPolicy, ResponseOutcome, ResponsePolicy, SubtasksPolicy, TagsPolicy,
};
pub use prompt::{AssistantPersona, PromptPair};
pub use types::{
    CallSettings, ChatRequest, ChatRole, ChatTurn, Operation, ParsedTask, Priority, Subtask,
    SubtaskId, TaskAnalysis, TaskBrief, TaskSnapshot,
};
