//! Narrows loaded documents down to the paths an inbound request can hit.

use std::collections::BTreeMap;

use url::Url;

use super::{OpenApiDocument, PathItem};
use crate::response::Request;

/// A document together with the subset of its paths that matched a request.
#[derive(Debug, Clone)]
pub struct MatchedSpec<'d> {
    pub name: &'d str,
    pub document: &'d OpenApiDocument,
    pub paths: Vec<(&'d str, &'d PathItem)>,
}

impl<'d> MatchedSpec<'d> {
    /// Every path of `document`, unfiltered.
    pub fn whole(name: &'d str, document: &'d OpenApiDocument) -> Self {
        Self {
            name,
            document,
            paths: document
                .paths
                .iter()
                .map(|(template, item)| (template.as_str(), item))
                .collect(),
        }
    }
}

/// Returns the documents declaring a path template that matches
/// `request.pathname`.
///
/// Within a document, paths that also declare the request's method are
/// preferred. When a path matches but none declares the method, the matching
/// paths are still returned so the caller can report the missing method.
pub fn match_request<'d>(
    request: &Request,
    documents: &'d BTreeMap<String, OpenApiDocument>,
) -> Vec<MatchedSpec<'d>> {
    documents
        .iter()
        .filter_map(|(name, document)| {
            let candidates = candidate_paths(document, &request.pathname);

            let by_path: Vec<(&str, &PathItem)> = document
                .paths
                .iter()
                .filter(|(template, _)| {
                    candidates
                        .iter()
                        .any(|candidate| path_matches(template, candidate))
                })
                .map(|(template, item)| (template.as_str(), item))
                .collect();

            if by_path.is_empty() {
                return None;
            }

            let with_method: Vec<(&str, &PathItem)> = by_path
                .iter()
                .filter(|(_, item)| item.operation(&request.method).is_some())
                .copied()
                .collect();

            Some(MatchedSpec {
                name: name.as_str(),
                document,
                paths: if with_method.is_empty() {
                    by_path
                } else {
                    with_method
                },
            })
        })
        .collect()
}

/// `true` when `path` fits `template`, where each `{param}` segment matches
/// exactly one non-empty segment.
pub fn path_matches(template: &str, path: &str) -> bool {
    let template: Vec<&str> = segments(template).collect();
    let path: Vec<&str> = segments(path).collect();

    template.len() == path.len()
        && template
            .iter()
            .zip(path.iter())
            .all(|(expected, actual)| is_parameter(expected) || expected == actual)
}

fn is_parameter(segment: &str) -> bool {
    segment.len() > 2 && segment.starts_with('{') && segment.ends_with('}')
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// The request path as-is plus the path with each server base path removed.
fn candidate_paths(document: &OpenApiDocument, pathname: &str) -> Vec<String> {
    let pathname = pathname.split(['?', '#']).next().unwrap_or_default();
    let mut candidates = vec![pathname.to_string()];

    for server in &document.servers {
        let Some(base) = server_base_path(&server.url) else {
            continue;
        };
        if let Some(rest) = strip_base(pathname, &base) {
            candidates.push(rest.to_string());
        }
    }

    candidates
}

fn server_base_path(url: &str) -> Option<String> {
    let path = if url.starts_with('/') {
        url.to_string()
    } else {
        Url::parse(url).ok()?.path().to_string()
    };

    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn strip_base<'p>(pathname: &'p str, base: &str) -> Option<&'p str> {
    let rest = pathname.strip_prefix(base)?;
    if rest.is_empty() || rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}
