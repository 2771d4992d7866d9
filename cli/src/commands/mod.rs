pub mod cli;
pub mod ingest;
pub mod resolve;
