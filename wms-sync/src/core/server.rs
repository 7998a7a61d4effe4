//! Server Implementation
//!
//! HTTP 服务器启动和管理

use axum::Router;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;

use crate::core::tasks::BackgroundTasks;
use crate::core::{Config, Result, ServerError, ServerState};

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

/// 构建完整路由（测试也使用）
pub fn build_app(state: ServerState) -> Router {
    crate::api::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutting down...");
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await?,
        };

        let mut tasks = BackgroundTasks::new();
        state.start_background_tasks(&mut tasks);

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        tracing::info!("WMS sync server listening on {addr}");

        let served = axum::serve(listener, build_app(state))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(ServerError::Serve);

        tasks.shutdown().await;
        served
    }
}
