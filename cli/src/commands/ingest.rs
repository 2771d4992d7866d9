use taskbridge_core::api::{ingest, AppContext, CliError, TaskRequest};

use super::cli::IngestArgs;

pub async fn handle_ingest(args: IngestArgs, ctx: &AppContext) -> Result<i32, CliError> {
    let services = ctx.build_services().await?;
    let request = TaskRequest {
        task: args.task,
        name: args.name,
        date: args
            .date
            .unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
    };

    let report = ingest(&services, ctx.cfg(), &request).await?;
    let out = serde_json::to_string_pretty(&report)
        .map_err(|e| CliError::Command(format!("failed to render report: {e}")))?;
    println!("{out}");
    Ok(0)
}
