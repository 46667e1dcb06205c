//! Request/response descriptors and the logic that turns a matched document
//! into a faked response.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod error;
mod selector;

pub use error::ResponseError;
pub use selector::{CandidateContent, CandidateResponse, assemble, fake_response, select};

pub const CONTENT_TYPE: &str = "Content-Type";
pub const APPLICATION_JSON: &str = "application/json";
pub const TEXT_PLAIN: &str = "text/plain";

pub type Headers = BTreeMap<String, HeaderValue>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Single(String),
    Multiple(Vec<String>),
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        HeaderValue::Single(value.to_string())
    }
}

impl HeaderValue {
    /// All values in declaration order.
    pub fn values(&self) -> Vec<&str> {
        match self {
            HeaderValue::Single(v) => vec![v.as_str()],
            HeaderValue::Multiple(vs) => vs.iter().map(String::as_str).collect(),
        }
    }
}

/// An inbound HTTP request as seen by the mock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Lowercase HTTP method.
    pub method: String,
    pub pathname: String,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default)]
    pub body: String,
}

impl Request {
    pub fn new(method: &str, pathname: impl Into<String>) -> Self {
        Self {
            method: method.to_ascii_lowercase(),
            pathname: pathname.into(),
            headers: Headers::new(),
            body: String::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into(), HeaderValue::Single(value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }
}

/// The mocked answer handed back to the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status_code: u16,
    pub body: String,
    pub body_as_json: Option<Value>,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Response {
    /// A JSON response; the body is the serialized value.
    pub fn json(status_code: u16, value: Value, headers: Headers) -> Result<Self, ResponseError> {
        let mut headers = headers;
        headers.insert(CONTENT_TYPE.to_string(), APPLICATION_JSON.into());

        Ok(Self {
            status_code,
            body: serde_json::to_string(&value)?,
            body_as_json: Some(value),
            headers,
            timestamp: None,
        })
    }

    pub fn text(status_code: u16, body: String, headers: Headers) -> Self {
        let mut headers = headers;
        headers.insert(CONTENT_TYPE.to_string(), TEXT_PLAIN.into());

        Self {
            status_code,
            body,
            body_as_json: None,
            headers,
            timestamp: None,
        }
    }

    pub fn empty(status_code: u16, headers: Headers) -> Self {
        Self {
            status_code,
            body: String::new(),
            body_as_json: None,
            headers,
            timestamp: None,
        }
    }

    /// The fallback answer for anything that went wrong while matching or
    /// faking: status 500 with `{"message": ...}`.
    pub fn server_error(message: impl Into<String>) -> Self {
        let body_as_json = serde_json::json!({ "message": message.into() });

        Self {
            status_code: 500,
            body: body_as_json.to_string(),
            body_as_json: Some(body_as_json),
            headers: Headers::new(),
            timestamp: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// First value of header `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, value)| value.values().first().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_method_is_lowercased() {
        let request = Request::new("GET", "/pets");
        assert_eq!(request.method, "get");
    }

    #[test]
    fn response_serializes_camel_case() {
        let response = Response::json(200, json!({"id": 1}), Headers::new()).unwrap();
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["statusCode"], json!(200));
        assert_eq!(value["body"], json!(r#"{"id":1}"#));
        assert_eq!(value["bodyAsJson"], json!({"id": 1}));
        assert_eq!(value["headers"]["Content-Type"], json!("application/json"));
        assert!(value.get("timestamp").is_none());
    }

    #[test]
    fn header_values_are_untagged() {
        let mut headers = Headers::new();
        headers.insert("a".into(), "one".into());
        headers.insert(
            "b".into(),
            HeaderValue::Multiple(vec!["x".into(), "y".into()]),
        );

        let value = serde_json::to_value(&headers).unwrap();
        assert_eq!(value, json!({"a": "one", "b": ["x", "y"]}));

        let back: Headers = serde_json::from_value(value).unwrap();
        assert_eq!(back, headers);
    }

    #[test]
    fn server_error_carries_message() {
        let response = Response::server_error("boom");
        assert_eq!(response.status_code, 500);
        assert_eq!(response.body_as_json, Some(json!({"message": "boom"})));
        assert_eq!(response.body, r#"{"message":"boom"}"#);
    }

    #[test]
    fn empty_response_has_no_json() {
        let response = Response::empty(204, Headers::new());
        assert_eq!(response.body, "");
        assert!(response.body_as_json.is_none());
    }

    #[test]
    fn header_lookup_ignores_case() {
        let response = Response::text(200, "hi".into(), Headers::new());
        assert_eq!(response.header("content-type"), Some("text/plain"));
        assert_eq!(response.header("x-missing"), None);
    }

    #[test]
    fn request_deserializes_with_defaults() {
        let request: Request =
            serde_json::from_value(json!({"method": "get", "pathname": "/pets"})).unwrap();
        assert!(request.headers.is_empty());
        assert!(request.body.is_empty());
    }
}
