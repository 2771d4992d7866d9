//! Ingest engine: one inbound request turned into created tasks.
mod run;
mod types;

pub use run::ingest;
pub use types::{IngestReport, TaskOutcome, TaskStatus};
