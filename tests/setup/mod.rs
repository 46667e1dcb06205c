#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use specmock::MockService;
use specmock::api::AppState;
use specmock::config::FakerConfig;
use specmock::logs::LogBuffer;

pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

pub fn petstore_service(seed: Option<u64>) -> MockService {
    MockService::from_dir(
        &fixtures_dir(),
        FakerConfig {
            seed,
            ..Default::default()
        },
    )
}

pub fn app_state(seed: Option<u64>) -> AppState {
    AppState::new(Arc::new(petstore_service(seed)), LogBuffer::new(100))
}
