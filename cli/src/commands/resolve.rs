use taskbridge_core::api::{parse_tasks, AppContext, CliError, TaskResolver};
use taskbridge_plugins::factory;

use super::cli::ResolveArgs;

pub async fn handle_resolve(args: ResolveArgs, ctx: &AppContext) -> Result<i32, CliError> {
    let mut cfg = ctx.cfg().clone();
    if let Some(threshold) = args.threshold {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(CliError::Config(format!(
                "--threshold must be within [0, 1], got {threshold}"
            )));
        }
        cfg.matcher.threshold = threshold;
    }

    let raw = std::fs::read_to_string(&args.tasks_file)?;
    let tasks = parse_tasks(&raw).map_err(|e| {
        CliError::Command(format!("{}: {e}", args.tasks_file.display()))
    })?;

    let directory = factory::build_directory(&cfg)?;
    let dispatcher = factory::build_dispatcher(&cfg);
    let resolved = TaskResolver::from_config(directory, dispatcher, &cfg)
        .resolve_all(&tasks)
        .await;

    let out = serde_json::to_string_pretty(&resolved)
        .map_err(|e| CliError::Command(format!("failed to render tasks: {e}")))?;
    println!("{out}");
    Ok(0)
}
