use std::sync::Arc;

use axum::Router;
use axum::routing::{any, get};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::logs::LogBuffer;
use crate::service::MockService;

pub(crate) mod error;
pub(crate) mod handler;
pub(crate) mod logs;
pub(crate) mod types;

/// Prefix reserved for the server's own endpoints; everything else is mocked.
pub const ADMIN_PREFIX: &str = "/__admin";

#[derive(Clone)]
pub struct AppState {
    pub(crate) service: Arc<MockService>,
    pub(crate) log_buffer: LogBuffer,
}

impl AppState {
    pub fn new(service: Arc<MockService>, log_buffer: LogBuffer) -> Self {
        Self {
            service,
            log_buffer,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/__admin/health", get(handler::health))
        .route("/__admin/logs", get(logs::get_logs))
        .route("/__admin/{*rest}", any(handler::admin_not_found))
        .fallback(handler::mock)
        .with_state(state)
}

pub async fn start_server(state: AppState, addr: &str) -> anyhow::Result<()> {
    let app = router(state);

    info!("mock server listening on: {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(err) => error!("unable to listen to shutdown signal: {}", err),
    }
}
