//! HTTP API数据模型

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use taskbridge_core::api::{IngestError, IngestReport, TaskOutcome};

use crate::http::state::StatsSnapshot;

// ============= Task =============

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub success: bool,
    pub created: usize,
    pub failed: usize,
    pub cost: f64,
    pub results: Vec<TaskOutcome>,
}

impl From<IngestReport> for TaskResponse {
    fn from(report: IngestReport) -> Self {
        Self {
            success: true,
            created: report.created,
            failed: report.failed,
            cost: report.cost,
            results: report.outcomes,
        }
    }
}

// ============= Health =============

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub session_id: String,
    pub uptime_seconds: f64,
    pub stats: StatsSnapshot,
    pub timestamp: String,
}

// ============= Error Handling =============

#[derive(Debug)]
pub enum HttpServerError {
    InvalidRequest(String),
    /// Request was valid but yielded nothing to create.
    NoTasks(String),
    Upstream(String),
    AllFailed(String),
}

impl From<IngestError> for HttpServerError {
    fn from(err: IngestError) -> Self {
        let msg = err.to_string();
        match err {
            IngestError::InvalidInput(_) => Self::InvalidRequest(msg),
            IngestError::NoTasks => Self::NoTasks(msg),
            IngestError::Extraction(_) | IngestError::Cost(_) | IngestError::Parse(_) => {
                Self::Upstream(msg)
            }
            IngestError::AllFailed { .. } => Self::AllFailed(msg),
        }
    }
}

impl IntoResponse for HttpServerError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            Self::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg),
            Self::NoTasks(msg) => (StatusCode::BAD_REQUEST, "NO_TASKS", msg),
            Self::Upstream(msg) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", msg),
            Self::AllFailed(msg) => (StatusCode::BAD_GATEWAY, "ALL_TASKS_FAILED", msg),
        };

        let body = serde_json::json!({
            "success": false,
            "error": message,
            "error_code": error_code,
        });

        (status, Json(body)).into_response()
    }
}
