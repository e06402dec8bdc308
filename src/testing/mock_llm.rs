// src/testing/mock_llm.rs
// Scripted completion client: canned answers and failures per operation

use crate::enrich::Operation;
use crate::llm::{CompletionClient, CompletionRequest};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
enum Scripted {
    Respond(String),
    Fail(String),
}

/// Mock completion client keyed by enrichment operation.
///
/// Unscripted operations fail like an unreachable upstream. Every request is
/// recorded, and the peak number of concurrent calls is tracked so tests can
/// tell a fan-out from sequential calls.
#[derive(Debug, Default)]
pub struct MockCompletionClient {
    scripted: Mutex<HashMap<Operation, Scripted>>,
    requests: Mutex<Vec<CompletionRequest>>,
    per_operation_latency: Mutex<HashMap<Operation, Duration>>,
    latency: Option<Duration>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockCompletionClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every answer (simulates a slow upstream)
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Delay answers of one operation only
    pub fn delay(&self, operation: Operation, latency: Duration) {
        lock(&self.per_operation_latency).insert(operation, latency);
    }

    /// Answer `operation` with `text`
    pub fn respond(&self, operation: Operation, text: impl Into<String>) {
        lock(&self.scripted).insert(operation, Scripted::Respond(text.into()));
    }

    /// Make `operation` fail as an upstream error
    pub fn fail(&self, operation: Operation, message: impl Into<String>) {
        lock(&self.scripted).insert(operation, Scripted::Fail(message.into()));
    }

    /// All requests received so far, in arrival order
    pub fn requests(&self) -> Vec<CompletionRequest> {
        lock(&self.requests).clone()
    }

    /// Requests received for one operation
    pub fn requests_for(&self, operation: Operation) -> Vec<CompletionRequest> {
        lock(&self.requests)
            .iter()
            .filter(|r| r.operation == operation)
            .cloned()
            .collect()
    }

    /// Highest number of calls that were in flight at the same time
    pub fn peak_concurrency(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn latency_for(&self, operation: Operation) -> Option<Duration> {
        lock(&self.per_operation_latency)
            .get(&operation)
            .copied()
            .or(self.latency)
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let operation = request.operation;
        lock(&self.requests).push(request);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(latency) = self.latency_for(operation) {
            tokio::time::sleep(latency).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let scripted = lock(&self.scripted).get(&operation).cloned();
        debug!(operation = %operation, scripted = ?scripted, "[MockCompletionClient] Answering");
        match scripted {
            Some(Scripted::Respond(text)) => Ok(text),
            Some(Scripted::Fail(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("no scripted response for {}", operation)),
        }
    }

    fn name(&self) -> &'static str {
        "Mock"
    }
}
