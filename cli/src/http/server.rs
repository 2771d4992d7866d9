//! HTTP服务器生命周期管理

use super::{
    middleware::{create_middleware_stack, request_logger},
    routes::create_router,
    AppState,
};
use crate::commands::cli::ServeArgs;
use axum::middleware;
use std::net::SocketAddr;
use taskbridge_core::api::{AppContext, CliError};
use tokio::signal;
use tracing::{info, warn};
use uuid::Uuid;

/// HTTP服务器配置
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 处理 serve 命令：CLI 参数优先，配置文件作为默认值
pub async fn handle_serve(args: ServeArgs, ctx: &AppContext) -> Result<i32, CliError> {
    let session_id = Uuid::new_v4().to_string();
    let http_cfg = &ctx.cfg().http_server;
    let config = ServerConfig {
        host: args.host.unwrap_or_else(|| http_cfg.host.clone()),
        port: args.port.unwrap_or(http_cfg.port),
    };

    if ctx.cfg().directory.tasks_database_id.trim().is_empty() {
        warn!(
            target: "taskbridge.http",
            "directory.tasks_database_id is empty; task creation will be rejected upstream"
        );
    }

    let services = ctx.build_services().await?;
    let state = AppState::new(session_id.clone(), ctx.clone(), services);

    start_server(session_id, config, state)
        .await
        .map_err(|e: Box<dyn std::error::Error + Send + Sync>| CliError::Command(e.to_string()))?;

    Ok(0)
}

/// 启动HTTP服务器，收到关闭信号后取消共享调度器
pub async fn start_server(
    session_id: String,
    config: ServerConfig,
    state: AppState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!(
        "Starting HTTP server on {}:{} (session: {})",
        config.host, config.port, session_id
    );

    let dispatcher = state.services.dispatcher.clone();

    let app = create_router(state)
        .layer(middleware::from_fn(request_logger))
        .layer(create_middleware_stack());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = signal::ctrl_c() => {
                    info!("Received Ctrl+C signal");
                }
                _ = wait_for_sigterm() => {
                    info!("Received SIGTERM signal");
                }
            }

            // In-flight requests stop waiting on the directory and fail fast.
            dispatcher.cancel();
            info!("Starting graceful shutdown...");
        })
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// 等待 SIGTERM 信号（Unix系统）
#[cfg(unix)]
async fn wait_for_sigterm() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            warn!("Failed to setup SIGTERM handler: {}", e);
            std::future::pending::<()>().await
        }
    }
}

/// Windows 系统不支持 SIGTERM，使用空操作
#[cfg(not(unix))]
async fn wait_for_sigterm() {
    std::future::pending::<()>().await
}
