//! REST client
//!
//! Issues one GET per catalogue path. Aggregated shapes issue their paths in
//! order and fail as a whole if any one of them fails.

use std::time::{Duration, Instant};

use api_bench_core::{ApiClient, ApiKind, Outcome, QueryShape};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde_json::Value;

use crate::config::ApiConfig;
use crate::http::{build_client, payload_size, Failure, HttpConfig};
use crate::queries::RestQueries;
use crate::VendorError;

/// Media type requested from the REST API
pub const REST_ACCEPT: &str = "application/vnd.github.v3+json";

/// [`ApiClient`] for the REST API
#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    base_url: String,
    queries: RestQueries,
}

impl RestClient {
    /// Create a client for `api` issuing `queries`
    pub fn new(api: &ApiConfig, queries: RestQueries, http: &HttpConfig) -> Result<Self, VendorError> {
        let mut headers = vec![(ACCEPT, REST_ACCEPT.to_string())];
        if let Some(token) = &api.token {
            headers.push((AUTHORIZATION, format!("token {token}")));
        }
        let client = build_client(http, &headers)?;

        Ok(Self {
            client,
            base_url: api.rest_base_url.trim_end_matches('/').to_string(),
            queries,
        })
    }

    /// GET one path and decode its JSON body
    async fn fetch(&self, path: &str) -> Result<(u16, Value), Failure> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).send().await?;
        let status = response.status();

        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(Failure::http(status));
        }
        let value = serde_json::from_slice(&body).map_err(|e| Failure::body(status, e))?;
        Ok((status.as_u16(), value))
    }

    fn failed(&self, shape: QueryShape, elapsed: Duration, failure: Failure) -> Outcome {
        tracing::debug!(
            shape = %shape,
            status = ?failure.status,
            error = %failure.message,
            "REST request failed"
        );
        Outcome::failure(elapsed, failure.status, failure.message)
    }
}

#[async_trait]
impl ApiClient for RestClient {
    fn api_kind(&self) -> ApiKind {
        ApiKind::Rest
    }

    async fn execute(&self, shape: QueryShape) -> Outcome {
        let paths = self.queries.paths(shape);
        let start = Instant::now();

        let mut bodies = Vec::with_capacity(paths.len());
        let mut status = 0;
        for path in paths {
            match self.fetch(path).await {
                Ok((code, body)) => {
                    status = code;
                    bodies.push(body);
                }
                Err(failure) => return self.failed(shape, start.elapsed(), failure),
            }
        }
        let elapsed = start.elapsed();

        let payload = match shape {
            QueryShape::Aggregated => payload_size(&Value::Array(bodies)),
            QueryShape::Simple | QueryShape::Nested => match bodies.first() {
                Some(body) => payload_size(body),
                None => {
                    return self.failed(shape, elapsed, Failure::without_status("no REST path configured"))
                }
            },
        };

        Outcome::success(elapsed, payload, status)
    }
}
