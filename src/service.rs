use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use tracing::{info, warn};

use crate::config::FakerConfig;
use crate::faker::SchemaFaker;
use crate::openapi::{self, MatchedSpec, OpenApiDocument};
use crate::response::{self, Request, Response, ResponseError};

/// Answers requests with responses faked from a set of OpenAPI documents.
///
/// Documents are read-only after construction; every call draws a fresh
/// random source, so one service can be shared across request handlers.
pub struct MockService {
    documents: BTreeMap<String, OpenApiDocument>,
    settings: FakerConfig,
    requests_served: AtomicU64,
}

impl MockService {
    pub fn new(documents: BTreeMap<String, OpenApiDocument>, settings: FakerConfig) -> Self {
        Self {
            documents,
            settings,
            requests_served: AtomicU64::new(0),
        }
    }

    /// Loads every document under `dir`; a missing directory gives an empty
    /// service rather than an error.
    pub fn from_dir(dir: &Path, settings: FakerConfig) -> Self {
        Self::new(openapi::load_documents(dir), settings)
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Always produces a response. Matching and faking failures become a
    /// 500 whose body names the problem, the path and the method.
    pub fn get_response(&self, request: &Request) -> Response {
        match self.try_response(request) {
            Ok(response) => {
                info!(
                    method = %request.method,
                    path = %request.pathname,
                    status_code = response.status_code,
                    "served mock response"
                );
                response
            }
            Err(err) => {
                warn!(
                    method = %request.method,
                    path = %request.pathname,
                    "failed to mock response: {}",
                    err
                );
                Response::server_error(format!(
                    "{} for path={}, method={}",
                    err, request.pathname, request.method
                ))
            }
        }
    }

    /// Like [`MockService::get_response`] but surfaces the failure.
    pub fn try_response(&self, request: &Request) -> Result<Response, ResponseError> {
        let mut rng = self.next_rng();

        let matches = openapi::match_request(request, &self.documents);
        let spec: &MatchedSpec<'_> = matches
            .choose(&mut rng)
            .ok_or(ResponseError::NoValidSchemaMatch)?;

        let mut faker = SchemaFaker::with_parts(
            rng,
            crate::faker::FakeText,
            spec.document.definitions(),
        )
        .with_max_depth(self.settings.max_depth);

        response::fake_response(request, spec, &mut faker)
    }

    /// A seeded source derived from the configured seed and a request
    /// counter, or an OS-seeded one when no seed is configured.
    fn next_rng(&self) -> StdRng {
        let n = self.requests_served.fetch_add(1, Ordering::Relaxed);
        match self.settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(n)),
            None => StdRng::from_os_rng(),
        }
    }
}
