use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use crate::tasks::RawTask;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("no JSON object or array found in model response")]
    NoJson,
    #[error("invalid JSON in model response: {0}")]
    InvalidJson(String),
    #[error("expected a JSON array of tasks, got {0}")]
    UnexpectedShape(&'static str),
}

fn trailing_comma() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r",(\s*[}\]])").expect("static regex"))
}

/// Parse model output into raw tasks.
///
/// Plain JSON is tried first. Otherwise the text between the first `{`/`[`
/// and the last `}`/`]` is taken, trailing commas are dropped and parsing is
/// retried once. Entries without a usable `task_name` are skipped.
pub fn parse_tasks(content: &str) -> Result<Vec<RawTask>, ParseError> {
    let value = match serde_json::from_str::<Value>(content) {
        Ok(v) => v,
        Err(_) => repair(content)?,
    };

    let entries = match value {
        Value::Array(items) => items,
        obj @ Value::Object(_) => vec![obj],
        other => return Err(ParseError::UnexpectedShape(shape(&other))),
    };

    let total = entries.len();
    let tasks: Vec<RawTask> = entries.iter().filter_map(raw_task).collect();
    if tasks.len() < total {
        tracing::warn!(
            target: "taskbridge.llm",
            dropped = total - tasks.len(),
            kept = tasks.len(),
            "dropped model entries without a task name"
        );
    }
    Ok(tasks)
}

fn repair(content: &str) -> Result<Value, ParseError> {
    let start = content.find(['{', '[']).ok_or(ParseError::NoJson)?;
    let end = content.rfind(['}', ']']).ok_or(ParseError::NoJson)?;
    if end < start {
        return Err(ParseError::NoJson);
    }
    let sliced = &content[start..=end];
    let cleaned = trailing_comma().replace_all(sliced, "$1");
    tracing::debug!(target: "taskbridge.llm", "model response needed JSON repair");
    serde_json::from_str(&cleaned).map_err(|e| ParseError::InvalidJson(e.to_string()))
}

fn raw_task(entry: &Value) -> Option<RawTask> {
    let obj = entry.as_object()?;
    let text = |key: &str| {
        obj.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    Some(RawTask {
        task_name: text("task_name")?,
        assignee: text("assignee"),
        project: text("project"),
        due_date: text("due_date"),
    })
}

fn shape(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_clean_array() {
        let tasks = parse_tasks(
            r#"[{"task_name":"Write report","assignee":"Jon","project":"Apollo","due_date":"2024-05-01"}]"#,
        )
        .unwrap();
        assert_eq!(
            tasks,
            vec![RawTask {
                task_name: "Write report".into(),
                assignee: Some("Jon".into()),
                project: Some("Apollo".into()),
                due_date: Some("2024-05-01".into()),
            }]
        );
    }

    #[test]
    fn repairs_surrounding_prose_and_trailing_commas() {
        let content = "Sure! Here are the tasks:\n[\n  {\"task_name\": \"Call vendor\",},\n  {\"task_name\": \"Book room\"},\n]\nLet me know.";
        let names: Vec<String> = parse_tasks(content)
            .unwrap()
            .into_iter()
            .map(|t| t.task_name)
            .collect();
        assert_eq!(names, vec!["Call vendor", "Book room"]);
    }

    #[test]
    fn single_object_becomes_one_task() {
        let tasks = parse_tasks(r#"{"task_name":"Solo","assignee":null}"#).unwrap();
        assert_eq!(tasks, vec![RawTask::new("Solo")]);
    }

    #[test]
    fn entries_without_task_name_are_dropped() {
        let tasks =
            parse_tasks(r#"[{"assignee":"Jon"},{"task_name":"  "},{"task_name":"Keep"},3]"#)
                .unwrap();
        assert_eq!(tasks, vec![RawTask::new("Keep")]);
    }

    #[test]
    fn unusable_responses_are_errors() {
        assert_eq!(parse_tasks("no json here"), Err(ParseError::NoJson));
        assert!(matches!(
            parse_tasks("text [ {\"task_name\": } ] text"),
            Err(ParseError::InvalidJson(_))
        ));
        assert_eq!(
            parse_tasks("\"just a string\""),
            Err(ParseError::UnexpectedShape("a string"))
        );
    }

    #[test]
    fn empty_array_yields_no_tasks() {
        assert!(parse_tasks("[]").unwrap().is_empty());
    }
}
