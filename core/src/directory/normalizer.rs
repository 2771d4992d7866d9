use serde_json::Value;

use super::models::{DirectoryCandidate, RecordShape};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Skip {
    /// Wrong record kind (bot account, database object, ...). Not an error.
    Ineligible,
    MissingId,
    MissingName,
}

/// Map one raw directory record to a candidate, or `None` when the record is
/// not a human user account or a page, or its id or name cannot be extracted.
pub fn normalize(record: &Value, shape: RecordShape) -> Option<DirectoryCandidate> {
    match extract(record, shape) {
        Ok(candidate) => Some(candidate),
        Err(Skip::Ineligible) => None,
        Err(reason) => {
            log_skip(record, shape, reason);
            None
        }
    }
}

/// Normalize a whole collection pass, dropping ineligible and malformed records.
pub fn normalize_all(records: &[Value], shape: RecordShape) -> Vec<DirectoryCandidate> {
    let mut out = Vec::with_capacity(records.len());
    let mut malformed = 0usize;
    for record in records {
        match extract(record, shape) {
            Ok(candidate) => out.push(candidate),
            Err(Skip::Ineligible) => {}
            Err(reason) => {
                log_skip(record, shape, reason);
                malformed += 1;
            }
        }
    }
    if malformed > 0 {
        tracing::warn!(
            target: "taskbridge.directory",
            shape = shape.as_str(),
            malformed = malformed,
            kept = out.len(),
            "skipped malformed directory records"
        );
    }
    out
}

fn log_skip(record: &Value, shape: RecordShape, reason: Skip) {
    let id = record.get("id").and_then(Value::as_str).unwrap_or("<none>");
    tracing::debug!(
        target: "taskbridge.directory",
        shape = shape.as_str(),
        reason = ?reason,
        id = id,
        "skipping malformed directory record"
    );
}

fn extract(record: &Value, shape: RecordShape) -> Result<DirectoryCandidate, Skip> {
    let eligible = match shape {
        RecordShape::User => record.get("type").and_then(Value::as_str) == Some("person"),
        RecordShape::Page => record.get("object").and_then(Value::as_str) == Some("page"),
    };
    if !eligible {
        return Err(Skip::Ineligible);
    }

    let id = record
        .get("id")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(Skip::MissingId)?;

    let name = match shape {
        RecordShape::User => record
            .get("name")
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string()),
        RecordShape::Page => page_title(record),
    }
    .filter(|s| !s.is_empty())
    .ok_or(Skip::MissingName)?;

    Ok(DirectoryCandidate::new(name, id))
}

/// Plain text of a page's title property. The title property is the one whose
/// `type` is `"title"`; a property literally named `Name` is the fallback.
fn page_title(record: &Value) -> Option<String> {
    let properties = record.get("properties")?.as_object()?;
    let prop = properties
        .values()
        .find(|p| p.get("type").and_then(Value::as_str) == Some("title"))
        .or_else(|| properties.get("Name"))?;

    let segments = prop.get("title")?.as_array()?;
    let text: String = segments
        .iter()
        .filter_map(|seg| seg.get("plain_text").and_then(Value::as_str))
        .collect();
    Some(text.trim().to_string())
}
