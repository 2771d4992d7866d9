use taskbridge_core::api::ValidatedRequest;

/// System instructions for task extraction. The example answer keeps the
/// model on a bare JSON array.
pub(crate) fn system_prompt(req: &ValidatedRequest) -> String {
    format!(
        r#"You turn a short spoken or typed request into a list of tasks.
Answer with a JSON array only, no prose. Each element is an object with these keys:
- "task_name": short imperative title of the task (required)
- "assignee": name of the person responsible, if one is mentioned
- "project": name of the project, if one is mentioned
- "due_date": due date in YYYY-MM-DD format, if one is mentioned or implied
Omit keys that do not apply. If the request names no assignee, the task belongs to the requester.
The request was made by {name} at {date}; resolve relative dates like "tomorrow" or "Friday" against that moment.
Example answer:
[{{"task_name":"Send the budget to finance","assignee":"Jane","project":"Q3 Planning","due_date":"2024-07-12"}}]"#,
        name = req.name,
        date = req.date,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_carries_requester_and_date() {
        let req = ValidatedRequest {
            task: "Call Bob".into(),
            name: "Kim".into(),
            date: "2024-05-01T10:00:00.000Z".into(),
        };
        let prompt = system_prompt(&req);
        assert!(prompt.contains("made by Kim at 2024-05-01T10:00:00.000Z"));
        assert!(prompt.contains(r#"[{"task_name":"#));
    }
}
