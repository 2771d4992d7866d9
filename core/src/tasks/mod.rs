pub mod models;
pub mod orchestrator;
pub mod payload;
pub mod pipeline;

pub use models::{RawTask, ResolvedTask};
pub use orchestrator::TaskResolver;
pub use payload::{build_task_payload, build_task_payloads, AuditNote};
pub use pipeline::{WriteOutcome, WritePipeline, WriteSummary};
