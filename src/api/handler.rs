use axum::Json;
use axum::body::{Body, Bytes};
use axum::extract::{Request as HttpRequest, State};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderName, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response as HttpResponse};
use chrono::Utc;
use tracing::{debug, warn};

use crate::api::AppState;
use crate::api::error::ApiError;
use crate::api::types::HealthStatus;
use crate::response::{HeaderValue, Headers, Request, Response};

/// Upper bound on request bodies read into a mock [`Request`].
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// GET /__admin/health
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthStatus {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
            documents: state.service.document_count(),
        }),
    )
}

pub async fn admin_not_found(uri: Uri) -> ApiError {
    ApiError::AdminNotFound(uri.path().to_string())
}

/// Answers any non-admin request with a mocked response.
pub async fn mock(
    State(state): State<AppState>,
    request: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(ApiError::Body)?;

    let request = to_mock_request(&parts, &body);
    debug!(method = %request.method, path = %request.pathname, "mock request");

    let response = state
        .service
        .get_response(&request)
        .with_timestamp(Utc::now());

    Ok(into_http_response(response))
}

fn to_mock_request(parts: &Parts, body: &Bytes) -> Request {
    let mut headers = Headers::new();
    for name in parts.headers.keys() {
        let mut values: Vec<String> = parts
            .headers
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect();

        let value = if values.len() == 1 {
            HeaderValue::Single(values.remove(0))
        } else {
            HeaderValue::Multiple(values)
        };
        headers.insert(name.as_str().to_string(), value);
    }

    let mut request = Request::new(parts.method.as_str(), parts.uri.path())
        .with_body(String::from_utf8_lossy(body).into_owned());
    request.headers = headers;
    request
}

fn into_http_response(response: Response) -> HttpResponse {
    let status =
        StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut headers = HeaderMap::new();
    for (name, value) in &response.headers {
        let Ok(name) = HeaderName::from_bytes(name.as_bytes()) else {
            warn!("skipping invalid response header name: {}", name);
            continue;
        };
        for value in value.values() {
            match axum::http::HeaderValue::from_str(value) {
                Ok(value) => {
                    headers.append(name.clone(), value);
                }
                Err(_) => warn!("skipping invalid value for response header {}", name),
            }
        }
    }

    if let Some(timestamp) = response.timestamp {
        let date = timestamp.format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        if let Ok(date) = axum::http::HeaderValue::from_str(&date) {
            headers.insert(header::DATE, date);
        }
    }

    (status, headers, Body::from(response.body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;

    #[test]
    fn mock_request_keeps_repeated_headers() {
        let request = axum::http::Request::builder()
            .method(Method::POST)
            .uri("/pets?limit=1")
            .header("x-one", "a")
            .header("x-many", "b")
            .header("x-many", "c")
            .body(())
            .unwrap();
        let (parts, _) = request.into_parts();

        let request = to_mock_request(&parts, &Bytes::from_static(b"{\"name\":\"rex\"}"));

        assert_eq!(request.method, "post");
        assert_eq!(request.pathname, "/pets");
        assert_eq!(request.body, r#"{"name":"rex"}"#);
        assert_eq!(request.headers["x-one"], HeaderValue::Single("a".into()));
        assert_eq!(
            request.headers["x-many"],
            HeaderValue::Multiple(vec!["b".into(), "c".into()])
        );
    }

    #[test]
    fn invalid_utf8_body_is_lossy() {
        let (parts, _) = axum::http::Request::builder()
            .uri("/")
            .body(())
            .unwrap()
            .into_parts();
        let request = to_mock_request(&parts, &Bytes::from_static(&[0x66, 0xff, 0x6f]));
        assert_eq!(request.body, "f\u{fffd}o");
    }

    #[test]
    fn http_response_carries_status_headers_and_date() {
        let timestamp = "2024-01-15T10:30:00Z".parse().unwrap();
        let response = Response::json(201, serde_json::json!({"id": 1}), Headers::new())
            .unwrap()
            .with_timestamp(timestamp);

        let http = into_http_response(response);

        assert_eq!(http.status(), StatusCode::CREATED);
        assert_eq!(http.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(http.headers()[header::DATE], "Mon, 15 Jan 2024 10:30:00 GMT");
    }

    #[test]
    fn out_of_range_status_becomes_500() {
        let http = into_http_response(Response::empty(1000, Headers::new()));
        assert_eq!(http.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
