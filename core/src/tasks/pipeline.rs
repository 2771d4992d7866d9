use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::directory::DirectoryApi;
use crate::dispatch::{Dispatcher, RetryPolicy};
use crate::error::DirectoryError;

/// Per-task result of a creation call, positionally aligned with the input.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    Success(Value),
    Failure(DirectoryError),
}

impl WriteOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn created_id(&self) -> Option<&str> {
        match self {
            Self::Success(v) => v.get("id").and_then(Value::as_str),
            Self::Failure(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WriteSummary {
    pub created: usize,
    pub failed: usize,
}

impl WriteSummary {
    pub fn of(outcomes: &[WriteOutcome]) -> Self {
        let created = outcomes.iter().filter(|o| o.is_success()).count();
        Self {
            created,
            failed: outcomes.len() - created,
        }
    }

    pub fn all_failed(&self) -> bool {
        self.created == 0 && self.failed > 0
    }
}

pub struct WritePipeline {
    api: Arc<dyn DirectoryApi>,
    dispatcher: Arc<Dispatcher>,
    retry: RetryPolicy,
}

impl WritePipeline {
    pub fn new(api: Arc<dyn DirectoryApi>, dispatcher: Arc<Dispatcher>, retry: RetryPolicy) -> Self {
        Self {
            api,
            dispatcher,
            retry,
        }
    }

    /// Create one record per payload. Every payload is attempted regardless of
    /// how its siblings fare.
    pub async fn create_all(&self, payloads: Vec<Value>) -> Vec<WriteOutcome> {
        let outcomes = futures::future::join_all(
            payloads
                .into_iter()
                .enumerate()
                .map(|(idx, payload)| self.create_one(idx, payload)),
        )
        .await;

        let summary = WriteSummary::of(&outcomes);
        tracing::info!(
            target: "taskbridge.write",
            created = summary.created,
            failed = summary.failed,
            "write pipeline finished"
        );
        outcomes
    }

    async fn create_one(&self, idx: usize, payload: Value) -> WriteOutcome {
        let result = self
            .retry
            .run(&self.dispatcher, "create_record", || {
                self.api.create_record(payload.clone())
            })
            .await;

        match result {
            Ok(created) => {
                let id = created.get("id").and_then(Value::as_str).unwrap_or("<none>");
                tracing::debug!(
                    target: "taskbridge.write",
                    index = idx,
                    id = id,
                    "task created"
                );
                WriteOutcome::Success(created)
            }
            Err(err) => {
                tracing::warn!(
                    target: "taskbridge.write",
                    index = idx,
                    status = ?err.status(),
                    error = %err,
                    "task creation failed"
                );
                WriteOutcome::Failure(err)
            }
        }
    }
}
