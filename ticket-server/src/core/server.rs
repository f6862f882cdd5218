//! Server Implementation
//!
//! HTTP 服务器启动和管理

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::archival::ArchivalScheduler;
use crate::core::tasks::BackgroundTasks;
use crate::core::{Config, ServerState};
use crate::utils::time::parse_run_at;

/// HTTP Server
pub struct Server {
    config: Config,
    state: ServerState,
}

impl Server {
    /// Create server with an initialized state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self { config, state }
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        // Background tasks (archival scheduler)
        let mut tasks = BackgroundTasks::new();
        let scheduler = ArchivalScheduler::new(
            self.state.get_db(),
            tasks.shutdown_token(),
            parse_run_at(&self.config.archive_run_at),
        );
        tasks.spawn("event_archival", scheduler.run());

        // Router with ambient layers
        let app = api::router(self.state.clone())
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive());

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("🎫 Ticket server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutting down...");
            })
            .await?;

        tasks.shutdown().await;

        Ok(())
    }
}
