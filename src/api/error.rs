use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::api::types::Message;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("failed to read request body: {0}")]
    Body(#[source] axum::Error),

    #[error("no admin endpoint at '{0}'")]
    AdminNotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Body(_) => StatusCode::BAD_REQUEST,
            ApiError::AdminNotFound(_) => StatusCode::NOT_FOUND,
        };

        let message = self.to_string();
        warn!("API Client Error: {}", message);

        (status, Json(Message { message })).into_response()
    }
}
