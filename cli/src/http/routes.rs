//! HTTP路由handlers

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use taskbridge_core::api::{ingest, TaskRequest};

use crate::http::{models::*, state::AppState};

/// 创建所有路由
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/task", post(task_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// POST /task - 解析请求并创建任务
async fn task_handler(
    State(state): State<AppState>,
    Json(req): Json<TaskRequest>,
) -> Result<Json<TaskResponse>, HttpServerError> {
    // 更新统计
    state.with_stats(|stats| stats.increment_request("/task"));

    match ingest(&state.services, state.ctx.cfg(), &req).await {
        Ok(report) => {
            state.with_stats(|stats| stats.record_tasks(report.created, report.failed));
            Ok(Json(TaskResponse::from(report)))
        }
        Err(e) => {
            tracing::warn!(target: "taskbridge.http", error = %e, "task request failed");
            state.with_stats(|stats| stats.increment_error());
            Err(HttpServerError::from(e))
        }
    }
}

/// GET /health - 健康检查
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    state.with_stats(|stats| stats.increment_request("/health"));
    let (uptime_seconds, stats) =
        state.with_stats(|stats| (stats.uptime_seconds(), stats.snapshot()));

    Json(HealthResponse {
        status: "healthy".into(),
        session_id: state.session_id.clone(),
        uptime_seconds,
        stats,
        timestamp: Local::now().to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use taskbridge_core::api::{
        AppConfig, AppContext, CollectionPage, Completion, DirectoryApi, Dispatcher, PageRequest,
        RemoteError, Services, TaskExtractor, TokenUsage, ValidatedRequest,
    };
    use tower::ServiceExt;

    struct StubDirectory {
        fail_writes: bool,
    }

    #[async_trait]
    impl DirectoryApi for StubDirectory {
        fn name(&self) -> &str {
            "stub"
        }

        async fn list_people(&self, _req: PageRequest) -> Result<CollectionPage, RemoteError> {
            Ok(CollectionPage {
                items: vec![json!({"object":"user","type":"person","id":"u1","name":"Jonathan Smith"})],
                has_more: false,
                next_cursor: None,
            })
        }

        async fn query_records(
            &self,
            _database_id: &str,
            _req: PageRequest,
        ) -> Result<CollectionPage, RemoteError> {
            Ok(CollectionPage::default())
        }

        async fn create_record(&self, _payload: Value) -> Result<Value, RemoteError> {
            if self.fail_writes {
                Err(RemoteError::status(400, "validation_error"))
            } else {
                Ok(json!({"object":"page","id":"page-1"}))
            }
        }
    }

    struct StubExtractor;

    #[async_trait]
    impl TaskExtractor for StubExtractor {
        fn name(&self) -> &str {
            "stub"
        }

        async fn extract(&self, _req: &ValidatedRequest) -> anyhow::Result<Completion> {
            Ok(Completion {
                content: r#"[{"task_name":"Draft brief","assignee":"Jon"}]"#.into(),
                model: "gpt-3.5-turbo".into(),
                usage: TokenUsage {
                    prompt_tokens: 100,
                    completion_tokens: 20,
                },
            })
        }
    }

    fn app(fail_writes: bool) -> Router {
        let mut cfg = AppConfig::default();
        cfg.limiter.min_interval_ms = 0;
        cfg.retry.backoff_ms = 0;
        cfg.retry.jitter_ms = 0;
        cfg.directory.tasks_database_id = "tasks".into();
        let services = Services {
            directory: Arc::new(StubDirectory { fail_writes }),
            extractor: Arc::new(StubExtractor),
            dispatcher: Arc::new(Dispatcher::new(&cfg.limiter)),
        };
        let ctx = AppContext::new(cfg, None);
        create_router(AppState::new("test-session".into(), ctx, services))
    }

    fn post_task(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/task")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(resp: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_task_created() {
        let resp = app(false)
            .oneshot(post_task(json!({
                "task": "Jon drafts the brief",
                "name": "Kim",
                "date": "2024-05-01T10:00:00Z"
            })))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["created"], 1);
        assert_eq!(body["results"][0]["id"], "page-1");
    }

    #[tokio::test]
    async fn test_invalid_input_is_bad_request() {
        let resp = app(false)
            .oneshot(post_task(json!({ "task": "", "name": "Kim", "date": "2024-05-01" })))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error_code"], "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn test_all_failed_is_bad_gateway() {
        let resp = app(true)
            .oneshot(post_task(json!({
                "task": "Jon drafts the brief",
                "name": "Kim",
                "date": "2024-05-01"
            })))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_json(resp).await["error_code"], "ALL_TASKS_FAILED");
    }

    #[tokio::test]
    async fn test_health_reports_counters() {
        let app = app(false);
        let ok = app
            .clone()
            .oneshot(post_task(json!({
                "task": "Jon drafts the brief",
                "name": "Kim",
                "date": "2024-05-01"
            })))
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);
        let bad = app
            .clone()
            .oneshot(post_task(json!({ "task": "", "name": "Kim", "date": "2024-05-01" })))
            .await
            .unwrap();
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let stats = body_json(resp).await["stats"].clone();
        assert_eq!(stats["requests_total"], 3);
        assert_eq!(stats["requests_by_endpoint"]["/task"], 2);
        assert_eq!(stats["requests_by_endpoint"]["/health"], 1);
        assert_eq!(stats["errors_total"], 1);
        assert_eq!(stats["tasks_created"], 1);
        assert_eq!(stats["tasks_failed"], 0);
    }

    #[tokio::test]
    async fn test_health() {
        let resp = app(false)
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["session_id"], "test-session");
    }
}
