use thiserror::Error;

use crate::input::InputError;
use crate::llm::{CostError, ParseError};

#[derive(Error, Debug)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(String),
    #[error("command failed: {0}")]
    Command(String),
    #[error("ingest failed: {0}")]
    Ingest(#[from] IngestError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Request-level failures of the ingest flow. Per-task write failures are not
/// errors here; they are reported in the ingest report unless every task failed.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),
    #[error("task extraction failed: {0}")]
    Extraction(anyhow::Error),
    #[error("cost calculation failed: {0}")]
    Cost(#[from] CostError),
    #[error("unusable model response: {0}")]
    Parse(#[from] ParseError),
    #[error("model response contained no tasks")]
    NoTasks,
    #[error("all {failed} task(s) failed to be created")]
    AllFailed { failed: usize },
}
