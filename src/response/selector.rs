use rand::RngCore;
use rand::seq::IndexedRandom;
use tracing::debug;

use super::{APPLICATION_JSON, Headers, Request, Response, ResponseError, TEXT_PLAIN};
use crate::faker::{SchemaFaker, TextGenerator};
use crate::openapi::{MatchedSpec, ResponseObject, ResponseOrRef};
use crate::schema::SchemaNode;

/// What the chosen response declares as its body.
#[derive(Debug, Clone, Copy)]
pub enum CandidateContent<'d> {
    Empty,
    Json(&'d SchemaNode),
    Text,
}

/// The status code, content and headers picked to be faked for one request.
#[derive(Debug, Clone)]
pub struct CandidateResponse<'d> {
    pub status_code: u16,
    pub content: CandidateContent<'d>,
    pub headers: Headers,
}

/// Picks a path, then a declared response of the request's method on that
/// path, and works out what content to fake for it.
///
/// The path is drawn at random from `spec.paths`, which after matching holds
/// only the templates the request path fits.
pub fn select<'d>(
    request: &Request,
    spec: &MatchedSpec<'d>,
    rng: &mut dyn RngCore,
) -> Result<CandidateResponse<'d>, ResponseError> {
    let (template, path_item) = *spec.paths.choose(rng).ok_or(ResponseError::NoValidPath)?;
    let operation = path_item
        .operation(&request.method)
        .ok_or_else(|| ResponseError::NoValidMethod(request.method.clone()))?;

    let responses: Vec<(&String, &ResponseOrRef)> = operation
        .responses
        .iter()
        .flat_map(|responses| responses.iter())
        .collect();
    let (status_key, response) = *responses
        .choose(rng)
        .ok_or(ResponseError::NoResponsesDefined)?;

    let status_code = parse_status(status_key)?;
    let response = match response {
        ResponseOrRef::Response(response) => response,
        ResponseOrRef::Reference { reference } => spec
            .document
            .resolve_response(reference)
            .ok_or(ResponseError::NoResponsesDefined)?,
    };

    debug!(
        spec = spec.name,
        path = template,
        status_code,
        "selected response candidate"
    );

    if response.headers.as_ref().is_some_and(|h| !h.is_empty()) {
        debug!("response headers are declared but not generated");
    }

    Ok(CandidateResponse {
        status_code,
        content: select_content(response)?,
        headers: Headers::new(),
    })
}

fn select_content(response: &ResponseObject) -> Result<CandidateContent<'_>, ResponseError> {
    let Some(content) = response.content.as_ref().filter(|c| !c.is_empty()) else {
        return Ok(CandidateContent::Empty);
    };

    if let Some(media) = content.get(APPLICATION_JSON) {
        return media
            .schema
            .as_ref()
            .map(CandidateContent::Json)
            .ok_or_else(|| ResponseError::NoSchemaForContent(APPLICATION_JSON.to_string()));
    }

    if content.contains_key(TEXT_PLAIN) {
        return Ok(CandidateContent::Text);
    }

    Err(ResponseError::UnsupportedContentType(
        content.keys().cloned().collect(),
    ))
}

/// `"default"` stands for 400; `"2XX"`-style ranges for their first code.
fn parse_status(key: &str) -> Result<u16, ResponseError> {
    if key == "default" {
        return Ok(400);
    }

    let normalized = key.to_ascii_uppercase();
    let code = match normalized.strip_suffix("XX") {
        Some(class) if class.len() == 1 => format!("{}00", class),
        _ => normalized,
    };

    code.parse::<u16>()
        .ok()
        .filter(|c| (100..=599).contains(c))
        .ok_or_else(|| ResponseError::InvalidStatusCode(key.to_string()))
}

/// Turns a candidate into a [`Response`], generating the body with `faker`.
pub fn assemble<R, T>(
    candidate: CandidateResponse<'_>,
    faker: &mut SchemaFaker<'_, R, T>,
) -> Result<Response, ResponseError>
where
    R: RngCore,
    T: TextGenerator,
{
    let CandidateResponse {
        status_code,
        content,
        headers,
    } = candidate;

    match content {
        CandidateContent::Empty => Ok(Response::empty(status_code, headers)),
        CandidateContent::Json(schema) => {
            let body = faker.fake(schema)?;
            Response::json(status_code, body, headers)
        }
        CandidateContent::Text => Ok(Response::text(status_code, faker.sentence(), headers)),
    }
}

/// Selects a candidate from `spec` and fakes it.
pub fn fake_response<R, T>(
    request: &Request,
    spec: &MatchedSpec<'_>,
    faker: &mut SchemaFaker<'_, R, T>,
) -> Result<Response, ResponseError>
where
    R: RngCore,
    T: TextGenerator,
{
    let candidate = select(request, spec, faker.rng())?;
    assemble(candidate, faker)
}
