use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

pub mod api;
pub mod config;
pub mod faker;
pub mod logs;
pub mod openapi;
pub mod response;
pub mod schema;
pub mod service;

pub use faker::SchemaFaker;
pub use openapi::OpenApiDocument;
pub use response::{Request, Response};
pub use service::MockService;

use config::Config;

/// Loads `config_path` (defaults when the file is missing), installs logging,
/// reads the documents and serves mocks until interrupted.
pub async fn run_app(config_path: &str) -> anyhow::Result<()> {
    let config_missing = !Path::new(config_path).exists();
    let config = if config_missing {
        Config::default()
    } else {
        Config::load(config_path)
            .with_context(|| format!("failed to load config {}", config_path))?
    };

    let log_buffer = logs::init(&config.logs)?;
    if config_missing {
        warn!("config file {} not found, using defaults", config_path);
    }
    info!("config: {:?}", config);

    let service = MockService::from_dir(&config.specs.dir, config.faker.clone());

    let state = api::AppState::new(Arc::new(service), log_buffer);
    api::start_server(state, &config.server.addr())
        .await
        .context("mock server stopped with an error")
}
