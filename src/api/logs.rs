use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::logs::{LogEntry, LogFilter, LogLevel};

const DEFAULT_LIMIT: usize = 100;

/// Query parameters for GET /__admin/logs
#[derive(Debug, Deserialize, Default)]
pub struct LogsQuery {
    /// Minimum log level (trace, debug, info, warn, error)
    pub level: Option<String>,
    pub limit: Option<usize>,
    /// Only entries after this timestamp (RFC3339)
    pub since: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LogsResponse {
    pub logs: Vec<Arc<LogEntry>>,
}

impl LogsQuery {
    fn to_filter(&self) -> LogFilter {
        let mut filter = LogFilter::new();

        if let Some(level) = self
            .level
            .as_deref()
            .and_then(|l| l.parse::<LogLevel>().ok())
        {
            filter = filter.with_min_level(level);
        }

        if let Some(since) = self
            .since
            .as_deref()
            .and_then(|s| s.parse::<DateTime<Utc>>().ok())
        {
            filter = filter.with_since(since);
        }

        filter
    }
}

/// GET /__admin/logs - recent captured log entries, oldest first
pub async fn get_logs(
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> impl IntoResponse {
    let filter = query.to_filter();
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);

    let logs = state.log_buffer.get_recent(limit, &filter);

    (StatusCode::OK, Json(LogsResponse { logs }))
}
