use serde::{Deserialize, Serialize};

use crate::directory::DirectoryCandidate;

/// One task as structured by the language-model stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTask {
    pub task_name: String,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
}

impl RawTask {
    pub fn new(task_name: impl Into<String>) -> Self {
        Self {
            task_name: task_name.into(),
            assignee: None,
            project: None,
            due_date: None,
        }
    }

    pub fn assignee_ref(&self) -> Option<&str> {
        non_blank(self.assignee.as_deref())
    }

    pub fn project_ref(&self) -> Option<&str> {
        non_blank(self.project.as_deref())
    }

    pub fn due(&self) -> Option<&str> {
        non_blank(self.due_date.as_deref())
    }
}

fn non_blank(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}

/// A task with its references reconciled against the directory. Unresolved
/// references are absent fields, and serialize as absent keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTask {
    pub task: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<DirectoryCandidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<DirectoryCandidate>,
}
