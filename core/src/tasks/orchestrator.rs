use std::sync::Arc;

use tokio::sync::OnceCell;

use super::models::{RawTask, ResolvedTask};
use crate::config::AppConfig;
use crate::directory::{
    normalize_all, CollectionScope, DirectoryApi, DirectoryCandidate, FuzzyResolver,
    PaginatedCollector, RecordKind,
};
use crate::dispatch::{Dispatcher, RetryPolicy};
use crate::error::DirectoryError;

/// Reconciles the assignee and project references of raw tasks against the
/// remote directory.
pub struct TaskResolver {
    api: Arc<dyn DirectoryApi>,
    collector: PaginatedCollector,
    matcher: FuzzyResolver,
    people: CollectionScope,
    projects: Option<CollectionScope>,
    memoize: bool,
}

impl TaskResolver {
    pub fn new(
        api: Arc<dyn DirectoryApi>,
        collector: PaginatedCollector,
        matcher: FuzzyResolver,
        people: CollectionScope,
        projects: Option<CollectionScope>,
    ) -> Self {
        Self {
            api,
            collector,
            matcher,
            people,
            projects,
            memoize: true,
        }
    }

    pub fn from_config(
        api: Arc<dyn DirectoryApi>,
        dispatcher: Arc<Dispatcher>,
        cfg: &AppConfig,
    ) -> Self {
        let collector = PaginatedCollector::new(
            dispatcher,
            RetryPolicy::reads(&cfg.retry),
            cfg.directory.effective_page_size(),
        );
        let people = match &cfg.directory.people_database_id {
            Some(id) if !id.trim().is_empty() => CollectionScope::Database {
                database_id: id.clone(),
            },
            _ => CollectionScope::People,
        };
        let projects = cfg
            .directory
            .projects_database_id
            .as_ref()
            .filter(|id| !id.trim().is_empty())
            .map(|id| CollectionScope::Database {
                database_id: id.clone(),
            });

        Self::new(
            api,
            collector,
            FuzzyResolver::new(cfg.matcher.threshold),
            people,
            projects,
        )
        .with_memoization(cfg.directory.memoize_per_request)
    }

    pub fn with_memoization(mut self, memoize: bool) -> Self {
        self.memoize = memoize;
        self
    }

    pub fn with_matcher(mut self, matcher: FuzzyResolver) -> Self {
        self.matcher = matcher;
        self
    }

    /// Resolve every task, preserving input order. Tasks are resolved
    /// concurrently; the shared dispatcher bounds the actual remote traffic.
    /// A failed directory read only drops the affected field.
    pub async fn resolve_all(&self, tasks: &[RawTask]) -> Vec<ResolvedTask> {
        let pass = ResolutionPass {
            resolver: self,
            people: OnceCell::new(),
            projects: OnceCell::new(),
        };
        let resolved =
            futures::future::join_all(tasks.iter().map(|task| pass.resolve_task(task))).await;

        tracing::info!(
            target: "taskbridge.resolver",
            tasks = resolved.len(),
            assignees = resolved.iter().filter(|t| t.assignee.is_some()).count(),
            projects = resolved.iter().filter(|t| t.project.is_some()).count(),
            "resolution pass complete"
        );
        resolved
    }

    async fn load(&self, kind: RecordKind) -> Result<Vec<DirectoryCandidate>, DirectoryError> {
        let scope = match kind {
            RecordKind::Person => &self.people,
            RecordKind::Project => self.projects.as_ref().ok_or_else(|| {
                DirectoryError::Unconfigured("projects database id is not set".to_string())
            })?,
        };
        let records = self.collector.collect(self.api.as_ref(), scope).await?;
        Ok(normalize_all(&records, scope.record_shape()))
    }
}

/// State of one `resolve_all` invocation. Memoized directories live here and
/// are dropped with it.
struct ResolutionPass<'a> {
    resolver: &'a TaskResolver,
    people: OnceCell<Vec<DirectoryCandidate>>,
    projects: OnceCell<Vec<DirectoryCandidate>>,
}

impl ResolutionPass<'_> {
    async fn resolve_task(&self, task: &RawTask) -> ResolvedTask {
        let assignee = async {
            match task.assignee_ref() {
                Some(q) => self.resolve_field(q, RecordKind::Person).await,
                None => None,
            }
        };
        let project = async {
            match task.project_ref() {
                Some(q) => self.resolve_field(q, RecordKind::Project).await,
                None => None,
            }
        };
        let (assignee, project) = tokio::join!(assignee, project);

        ResolvedTask {
            task: task.task_name.clone(),
            due: task.due().map(str::to_string),
            assignee,
            project,
        }
    }

    async fn resolve_field(&self, query: &str, kind: RecordKind) -> Option<DirectoryCandidate> {
        let resolver = self.resolver;
        let result = if resolver.memoize {
            let cell = match kind {
                RecordKind::Person => &self.people,
                RecordKind::Project => &self.projects,
            };
            cell.get_or_try_init(|| resolver.load(kind))
                .await
                .map(|candidates| resolver.matcher.resolve(query, candidates))
        } else {
            resolver
                .load(kind)
                .await
                .map(|candidates| resolver.matcher.resolve(query, &candidates))
        };

        match result {
            Ok(resolution) => resolution.into_candidate(),
            Err(err) => {
                tracing::warn!(
                    target: "taskbridge.resolver",
                    kind = kind.as_str(),
                    query = %query,
                    error = %err,
                    "directory unavailable, leaving field unresolved"
                );
                None
            }
        }
    }
}
