//! HTTP服务器状态管理

use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use taskbridge_core::api::{AppContext, Services};

/// 应用状态（在所有handlers间共享）
#[derive(Clone)]
pub struct AppState {
    pub session_id: String,
    pub ctx: Arc<AppContext>,
    pub services: Arc<Services>,
    pub stats: Arc<RwLock<ServerStats>>,
}

impl AppState {
    pub fn new(session_id: String, ctx: AppContext, services: Services) -> Self {
        Self {
            session_id,
            ctx: Arc::new(ctx),
            services: Arc::new(services),
            stats: Arc::new(RwLock::new(ServerStats::new())),
        }
    }

    /// Poisoned locks still hold usable counters.
    pub fn with_stats<R>(&self, f: impl FnOnce(&mut ServerStats) -> R) -> R {
        let mut guard = self
            .stats
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }
}

/// 服务器统计信息
pub struct ServerStats {
    pub requests_total: u64,
    pub requests_by_endpoint: BTreeMap<String, u64>,
    pub errors_total: u64,
    pub tasks_created: u64,
    pub tasks_failed: u64,
    pub start_time: DateTime<Local>,
}

impl ServerStats {
    pub fn new() -> Self {
        Self {
            requests_total: 0,
            requests_by_endpoint: BTreeMap::new(),
            errors_total: 0,
            tasks_created: 0,
            tasks_failed: 0,
            start_time: Local::now(),
        }
    }

    pub fn increment_request(&mut self, endpoint: &str) {
        self.requests_total += 1;
        *self
            .requests_by_endpoint
            .entry(endpoint.to_string())
            .or_insert(0) += 1;
    }

    pub fn increment_error(&mut self) {
        self.errors_total += 1;
    }

    pub fn record_tasks(&mut self, created: usize, failed: usize) {
        self.tasks_created += created as u64;
        self.tasks_failed += failed as u64;
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            requests_total: self.requests_total,
            requests_by_endpoint: self.requests_by_endpoint.clone(),
            errors_total: self.errors_total,
            tasks_created: self.tasks_created,
            tasks_failed: self.tasks_failed,
        }
    }

    pub fn uptime_seconds(&self) -> f64 {
        let now = Local::now();
        (now - self.start_time).num_milliseconds() as f64 / 1000.0
    }
}

/// Counters reported by `/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub requests_total: u64,
    pub requests_by_endpoint: BTreeMap<String, u64>,
    pub errors_total: u64,
    pub tasks_created: u64,
    pub tasks_failed: u64,
}

impl Default for ServerStats {
    fn default() -> Self {
        Self::new()
    }
}
