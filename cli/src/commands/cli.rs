use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "taskbridge", version, about = "Turn free-text requests into workspace tasks")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file to load instead of the default search locations.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ServeArgs {
    /// Overrides `http_server.host`.
    #[arg(long)]
    pub host: Option<String>,

    /// Overrides `http_server.port`.
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct IngestArgs {
    #[arg(long)]
    pub task: String,

    /// Name of the requester.
    #[arg(long)]
    pub name: String,

    /// ISO-8601 request date; defaults to now.
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ResolveArgs {
    /// JSON array of `{task_name, assignee, project, due_date}` objects.
    #[arg(long)]
    pub tasks_file: PathBuf,

    /// Overrides `matcher.threshold` (0 = identical, 1 = unrelated).
    #[arg(long)]
    pub threshold: Option<f64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP endpoint.
    Serve(ServeArgs),
    /// Process one request and print the report.
    Ingest(IngestArgs),
    /// Resolve task references against the directory without creating anything.
    Resolve(ResolveArgs),
}
