#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use taskbridge_core::api::{
    AppConfig, CollectionPage, Completion, DirectoryApi, Dispatcher, PageRequest, RemoteError,
    Services, TaskExtractor, TokenUsage, ValidatedRequest,
};

pub const PEOPLE_DB: &str = "people-db";
pub const PROJECTS_DB: &str = "projects-db";
pub const TASKS_DB: &str = "tasks-db";

/// Config with no spacing and no backoff so tests run instantly.
pub fn fast_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.limiter.min_interval_ms = 0;
    cfg.limiter.throttle_fallback_ms = 0;
    cfg.retry.backoff_ms = 0;
    cfg.retry.jitter_ms = 0;
    cfg.directory.page_size = 2;
    cfg.directory.projects_database_id = Some(PROJECTS_DB.to_string());
    cfg.directory.tasks_database_id = TASKS_DB.to_string();
    cfg
}

pub fn person(id: &str, name: &str) -> Value {
    json!({ "object": "user", "type": "person", "id": id, "name": name })
}

pub fn bot(id: &str, name: &str) -> Value {
    json!({ "object": "user", "type": "bot", "id": id, "name": name })
}

pub fn project(id: &str, title: &str) -> Value {
    json!({
        "object": "page",
        "id": id,
        "properties": {
            "Name": { "id": "title", "type": "title", "title": [{ "plain_text": title }] }
        }
    })
}

/// Title of a page-creation payload built by the task pipeline.
pub fn payload_title(payload: &Value) -> &str {
    payload["properties"]["Name"]["title"][0]["text"]["content"]
        .as_str()
        .unwrap_or_default()
}

/// In-memory directory serving offset-cursor pages, with scripted failures.
#[derive(Default)]
pub struct FakeDirectory {
    people: Vec<Value>,
    people_rows: Vec<Value>,
    projects: Vec<Value>,
    people_errors: Mutex<VecDeque<RemoteError>>,
    project_errors: Mutex<VecDeque<RemoteError>>,
    create_errors: Mutex<HashMap<String, VecDeque<RemoteError>>>,
    pub people_calls: AtomicUsize,
    pub project_calls: AtomicUsize,
    create_attempts: Mutex<HashMap<String, usize>>,
    pub created: Mutex<Vec<Value>>,
}

impl FakeDirectory {
    pub fn new(people: Vec<Value>, projects: Vec<Value>) -> Self {
        Self {
            people,
            projects,
            ..Default::default()
        }
    }

    /// Serve `rows` as the pages of the people database.
    pub fn with_people_database(mut self, rows: Vec<Value>) -> Self {
        self.people_rows = rows;
        self
    }

    pub fn fail_people(self, errors: Vec<RemoteError>) -> Self {
        *self.people_errors.lock().unwrap() = errors.into();
        self
    }

    pub fn fail_projects(self, errors: Vec<RemoteError>) -> Self {
        *self.project_errors.lock().unwrap() = errors.into();
        self
    }

    /// Fail creation of the task titled `title` with `errors`, in order,
    /// before letting it succeed.
    pub fn fail_create(self, title: &str, errors: Vec<RemoteError>) -> Self {
        self.create_errors
            .lock()
            .unwrap()
            .insert(title.to_string(), errors.into());
        self
    }

    pub fn create_attempts(&self, title: &str) -> usize {
        self.create_attempts
            .lock()
            .unwrap()
            .get(title)
            .copied()
            .unwrap_or(0)
    }

    pub fn people_calls(&self) -> usize {
        self.people_calls.load(Ordering::SeqCst)
    }

    pub fn project_calls(&self) -> usize {
        self.project_calls.load(Ordering::SeqCst)
    }

    fn page(items: &[Value], req: &PageRequest) -> Result<CollectionPage, RemoteError> {
        let offset = match &req.start_cursor {
            None => 0,
            Some(c) => c
                .strip_prefix("offset-")
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| RemoteError::status(400, "invalid start_cursor"))?,
        };
        let size = req.page_size as usize;
        let end = (offset + size).min(items.len());
        let has_more = end < items.len();
        Ok(CollectionPage {
            items: items[offset.min(end)..end].to_vec(),
            has_more,
            next_cursor: has_more.then(|| format!("offset-{end}")),
        })
    }
}

#[async_trait]
impl DirectoryApi for FakeDirectory {
    fn name(&self) -> &str {
        "fake"
    }

    async fn list_people(&self, req: PageRequest) -> Result<CollectionPage, RemoteError> {
        self.people_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.people_errors.lock().unwrap().pop_front() {
            return Err(err);
        }
        Self::page(&self.people, &req)
    }

    async fn query_records(
        &self,
        database_id: &str,
        req: PageRequest,
    ) -> Result<CollectionPage, RemoteError> {
        match database_id {
            PEOPLE_DB => {
                self.people_calls.fetch_add(1, Ordering::SeqCst);
                Self::page(&self.people_rows, &req)
            }
            PROJECTS_DB => {
                self.project_calls.fetch_add(1, Ordering::SeqCst);
                if let Some(err) = self.project_errors.lock().unwrap().pop_front() {
                    return Err(err);
                }
                Self::page(&self.projects, &req)
            }
            _ => Err(RemoteError::status(404, "database not found")),
        }
    }

    async fn create_record(&self, payload: Value) -> Result<Value, RemoteError> {
        let title = payload_title(&payload).to_string();
        *self
            .create_attempts
            .lock()
            .unwrap()
            .entry(title.clone())
            .or_default() += 1;

        let scripted = self
            .create_errors
            .lock()
            .unwrap()
            .get_mut(&title)
            .and_then(VecDeque::pop_front);
        if let Some(err) = scripted {
            return Err(err);
        }

        let mut created = self.created.lock().unwrap();
        let id = format!("page-{}", created.len() + 1);
        created.push(payload);
        Ok(json!({ "object": "page", "id": id }))
    }
}

/// Extractor returning a canned completion.
pub struct FakeExtractor {
    pub content: String,
    pub usage: TokenUsage,
}

impl FakeExtractor {
    pub fn returning(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: TokenUsage {
                prompt_tokens: 1000,
                completion_tokens: 500,
            },
        }
    }
}

#[async_trait]
impl TaskExtractor for FakeExtractor {
    fn name(&self) -> &str {
        "fake"
    }

    async fn extract(&self, _req: &ValidatedRequest) -> anyhow::Result<Completion> {
        Ok(Completion {
            content: self.content.clone(),
            model: "gpt-3.5-turbo-0613".to_string(),
            usage: self.usage,
        })
    }
}

pub fn services(
    cfg: &AppConfig,
    directory: Arc<FakeDirectory>,
    extractor: FakeExtractor,
) -> Services {
    Services {
        directory,
        extractor: Arc::new(extractor),
        dispatcher: Arc::new(Dispatcher::new(&cfg.limiter)),
    }
}
