use thiserror::Error;

use crate::faker::FakerError;

pub const NO_RESPONSES_DEFINED: &str = "While a stub for a specification exists for this endpoint, it contains no responses. That usually means the schema is corrupt or it has been constrained too much (ie asking for a 201 response when it only has 200 and 400).";

#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("Could not find a valid OpenAPI schema")]
    NoValidSchemaMatch,

    #[error("Could not find a valid path")]
    NoValidPath,

    #[error("Could not find the appropriate method")]
    NoValidMethod(String),

    #[error("{}", NO_RESPONSES_DEFINED)]
    NoResponsesDefined,

    #[error("Could not find schema for content type '{0}'")]
    NoSchemaForContent(String),

    #[error("Could not produce content for these mime types {0:?}")]
    UnsupportedContentType(Vec<String>),

    #[error("Invalid response status code '{0}'")]
    InvalidStatusCode(String),

    #[error(transparent)]
    Faker(#[from] FakerError),

    #[error("failed to serialize response body: {0}")]
    Json(#[from] serde_json::Error),
}
