use serde::{Deserialize, Serialize};

use crate::tasks::{ResolvedTask, WriteOutcome, WriteSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Created,
    Failed,
}

/// Result of one task of the request, in extraction order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOutcome {
    pub task: String,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskOutcome {
    pub(crate) fn from_write(task: &ResolvedTask, outcome: &WriteOutcome) -> Self {
        match outcome {
            WriteOutcome::Success(_) => Self {
                task: task.task.clone(),
                status: TaskStatus::Created,
                id: outcome.created_id().map(str::to_string),
                error: None,
            },
            WriteOutcome::Failure(err) => Self {
                task: task.task.clone(),
                status: TaskStatus::Failed,
                id: None,
                error: Some(err.to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Language-model cost in dollars.
    pub cost: f64,
    pub created: usize,
    pub failed: usize,
    pub outcomes: Vec<TaskOutcome>,
}

impl IngestReport {
    pub(crate) fn new(cost: f64, tasks: &[ResolvedTask], writes: &[WriteOutcome]) -> Self {
        let WriteSummary { created, failed } = WriteSummary::of(writes);
        Self {
            cost,
            created,
            failed,
            outcomes: tasks
                .iter()
                .zip(writes)
                .map(|(task, outcome)| TaskOutcome::from_write(task, outcome))
                .collect(),
        }
    }
}
