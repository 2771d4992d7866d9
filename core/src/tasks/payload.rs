use serde_json::{json, Map, Value};

use super::models::ResolvedTask;

/// Remote limits on one rich-text object and on a rich-text array.
const RICH_TEXT_MAX_CHARS: usize = 2000;
const RICH_TEXT_MAX_ITEMS: usize = 100;

/// Audit context attached to every created task.
#[derive(Debug, Clone)]
pub struct AuditNote {
    pub source: String,
    /// Language-model cost of the request, in dollars.
    pub cost: f64,
    /// The original request body, echoed into the task page.
    pub request: Value,
}

pub fn build_task_payloads(
    tasks: &[ResolvedTask],
    audit: &AuditNote,
    tasks_database_id: &str,
) -> Vec<Value> {
    tasks
        .iter()
        .map(|task| build_task_payload(task, audit, tasks_database_id))
        .collect()
}

/// Page-creation payload for one resolved task. Optional relations are only
/// emitted when the task carries them.
pub fn build_task_payload(task: &ResolvedTask, audit: &AuditNote, tasks_database_id: &str) -> Value {
    let mut properties = Map::new();
    properties.insert(
        "Name".to_string(),
        json!({ "title": [{ "text": { "content": task.task } }] }),
    );
    properties.insert(
        "Source".to_string(),
        json!({ "select": { "name": audit.source } }),
    );
    if let Some(assignee) = &task.assignee {
        properties.insert(
            "Assignee".to_string(),
            json!({ "people": [{ "id": assignee.id }] }),
        );
    }
    if let Some(due) = &task.due {
        properties.insert("Due".to_string(), json!({ "date": { "start": due } }));
    }
    if let Some(project) = &task.project {
        properties.insert(
            "Project".to_string(),
            json!({ "relation": [{ "id": project.id }] }),
        );
    }

    json!({
        "parent": { "database_id": tasks_database_id },
        "properties": properties,
        "children": [audit_callout(audit)],
    })
}

fn audit_callout(audit: &AuditNote) -> Value {
    let request =
        serde_json::to_string_pretty(&audit.request).unwrap_or_else(|_| audit.request.to_string());
    json!({
        "object": "block",
        "type": "callout",
        "callout": {
            "icon": { "emoji": "🤖" },
            "color": "blue_background",
            "rich_text": [{
                "text": {
                    "content": format!(
                        "This task was created via the {}. The cost of this request was ${:.4}.",
                        audit.source, audit.cost
                    )
                }
            }],
            "children": [
                {
                    "paragraph": {
                        "rich_text": [{
                            "type": "text",
                            "text": { "content": "Full request details for this task (may contain other tasks):" }
                        }]
                    }
                },
                {
                    "code": {
                        "language": "json",
                        "rich_text": rich_text_chunks(&request)
                    }
                }
            ]
        }
    })
}

/// Split `text` into rich-text objects that each fit the remote's length cap.
/// Text beyond the last allowed object is dropped.
fn rich_text_chunks(text: &str) -> Vec<Value> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(RICH_TEXT_MAX_CHARS)
        .take(RICH_TEXT_MAX_ITEMS)
        .map(|chunk| {
            let content: String = chunk.iter().collect();
            json!({ "type": "text", "text": { "content": content } })
        })
        .collect()
}
