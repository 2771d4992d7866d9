//! Request-level layers: CORS, timeout, access log.

use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request},
    middleware::Next,
    response::Response,
};
use std::time::{Duration, Instant};
use tower::layer::util::Stack;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
};

/// One request may wait on the model and on several spaced directory calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(180);

const LOCAL_ORIGIN_PREFIXES: [&str; 4] = [
    "http://localhost",
    "https://localhost",
    "http://127.0.0.1",
    "https://127.0.0.1",
];

pub fn create_middleware_stack() -> Stack<CorsLayer, TimeoutLayer> {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(|origin: &HeaderValue, _| {
            origin.to_str().is_ok_and(is_local_origin)
        }))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600));

    Stack::new(cors, TimeoutLayer::new(REQUEST_TIMEOUT))
}

/// Browser callers are only accepted from the local machine.
fn is_local_origin(origin: &str) -> bool {
    LOCAL_ORIGIN_PREFIXES.iter().any(|prefix| {
        origin
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(':'))
    })
}

/// Access log: one line per request, at warn for 4xx/5xx.
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let elapsed_ms = started.elapsed().as_millis() as u64;
    if status >= 400 {
        tracing::warn!(target: "taskbridge.http", %method, %path, status, elapsed_ms, "request failed");
    } else {
        tracing::info!(target: "taskbridge.http", %method, %path, status, elapsed_ms, "request served");
    }

    response
}
