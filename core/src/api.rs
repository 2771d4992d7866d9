//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `taskbridge_core::api` instead of reaching into internal modules.

pub use crate::config::{
    get_taskbridge_data_dir, load, load_default, load_from_path, AppConfig, DirectoryConfig,
    HttpServerConfig, LimiterConfig, LlmConfig, LoggingConfig, MatcherConfig, RetryConfig,
    WorkflowConfig,
};
pub use crate::context::{AppContext, Services, ServicesFactory};
pub use crate::directory::{
    normalize, normalize_all, CollectionPage, CollectionScope, DirectoryApi, DirectoryCandidate,
    FuzzyResolver, PageRequest, PaginatedCollector, RecordKind, RecordShape,
    ResolutionResult,
};
pub use crate::dispatch::{DispatchOutcome, Dispatcher, RetryPolicy};
pub use crate::engine::{ingest, IngestReport, TaskOutcome, TaskStatus};
pub use crate::error::{CliError, DirectoryError, IngestError, RemoteError};
pub use crate::input::{validate_request, InputError, TaskRequest, ValidatedRequest};
pub use crate::llm::{calculate_cost, parse_tasks, Completion, TaskExtractor, TokenUsage};
pub use crate::tasks::{
    build_task_payload, build_task_payloads, AuditNote, RawTask, ResolvedTask, TaskResolver,
    WriteOutcome, WritePipeline, WriteSummary,
};
