use serde_json::Value;

use super::types::IngestReport;
use crate::config::AppConfig;
use crate::context::Services;
use crate::dispatch::RetryPolicy;
use crate::error::IngestError;
use crate::input::{validate_request, TaskRequest};
use crate::llm::{calculate_cost, parse_tasks};
use crate::tasks::{build_task_payloads, AuditNote, TaskResolver, WritePipeline, WriteSummary};

/// Run the whole ingest flow for one request: validate, extract, price,
/// parse, resolve references, then create every task.
///
/// Per-task write failures are reported in the returned report; the call
/// only fails when nothing could be created.
pub async fn ingest(
    services: &Services,
    cfg: &AppConfig,
    request: &TaskRequest,
) -> Result<IngestReport, IngestError> {
    let validated = validate_request(request)?;
    tracing::info!(
        target: "taskbridge.ingest",
        requester = %validated.name,
        date = %validated.date,
        extractor = services.extractor.name(),
        "ingest request accepted"
    );

    let completion = services
        .extractor
        .extract(&validated)
        .await
        .map_err(IngestError::Extraction)?;
    let cost = calculate_cost(&completion.usage, &completion.model)?;
    tracing::info!(
        target: "taskbridge.ingest",
        model = %completion.model,
        prompt_tokens = completion.usage.prompt_tokens,
        completion_tokens = completion.usage.completion_tokens,
        cost = %format!("{cost:.3}"),
        "model extraction complete"
    );

    let raw = parse_tasks(&completion.content)?;
    if raw.is_empty() {
        return Err(IngestError::NoTasks);
    }

    let resolver = TaskResolver::from_config(
        services.directory.clone(),
        services.dispatcher.clone(),
        cfg,
    );
    let resolved = resolver.resolve_all(&raw).await;

    let audit = AuditNote {
        source: cfg.workflow.source.clone(),
        cost,
        request: serde_json::to_value(request).unwrap_or(Value::Null),
    };
    let payloads = build_task_payloads(&resolved, &audit, &cfg.directory.tasks_database_id);

    let pipeline = WritePipeline::new(
        services.directory.clone(),
        services.dispatcher.clone(),
        RetryPolicy::writes(&cfg.retry),
    );
    let writes = pipeline.create_all(payloads).await;

    let summary = WriteSummary::of(&writes);
    if summary.all_failed() {
        return Err(IngestError::AllFailed {
            failed: summary.failed,
        });
    }
    Ok(IngestReport::new(cost, &resolved, &writes))
}
