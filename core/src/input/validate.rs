use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const MAX_NAME_LEN: usize = 50;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("task must only contain letters, numbers, and punctuation")]
    TaskCharacters,
    #[error("name must be {MAX_NAME_LEN} characters or less")]
    NameTooLong,
    #[error("date must be a string in ISO 8601 format, got {0:?}")]
    InvalidDate(String),
}

/// Request body as submitted by a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRequest {
    #[serde(default)]
    pub task: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedRequest {
    pub task: String,
    /// Name of the person submitting the request.
    pub name: String,
    /// Request timestamp, RFC 3339 UTC with millisecond precision.
    pub date: String,
}

fn task_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9.,!?;:'$\- ]*$").expect("static regex"))
}

pub fn validate_request(req: &TaskRequest) -> Result<ValidatedRequest, InputError> {
    let task = req.task.trim();
    if task.is_empty() {
        return Err(InputError::Missing("task"));
    }
    if !task_pattern().is_match(task) {
        return Err(InputError::TaskCharacters);
    }

    let name = req.name.trim();
    if name.is_empty() {
        return Err(InputError::Missing("name"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(InputError::NameTooLong);
    }

    let date = req.date.trim();
    if date.is_empty() {
        return Err(InputError::Missing("date"));
    }
    let date = parse_iso_date(date).ok_or_else(|| InputError::InvalidDate(date.to_string()))?;

    Ok(ValidatedRequest {
        task: escape_html(task),
        name: escape_html(name),
        date: date.to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

fn parse_iso_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            '\\' => out.push_str("&#x5C;"),
            '`' => out.push_str("&#96;"),
            _ => out.push(ch),
        }
    }
    out
}
