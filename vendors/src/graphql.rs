//! GraphQL client

use std::time::Instant;

use api_bench_core::{ApiClient, ApiKind, Outcome, QueryShape};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::ApiConfig;
use crate::http::{build_client, payload_size, Failure, HttpConfig};
use crate::queries::GraphQlQueries;
use crate::VendorError;

/// Response envelope of a GraphQL endpoint
#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    #[serde(default)]
    message: String,
}

impl GraphQlResponse {
    /// Payload of a successful response, or why it is not one
    ///
    /// Execution errors arrive with a 2xx status, so they carry no HTTP status.
    fn into_data(self) -> Result<Value, Failure> {
        if !self.errors.is_empty() {
            let messages: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
            return Err(Failure::without_status(format!(
                "GraphQL errors: {}",
                messages.join("; ")
            )));
        }
        match self.data {
            Some(data) if !data.is_null() => Ok(data),
            _ => Err(Failure::without_status("GraphQL response has no data")),
        }
    }
}

/// [`ApiClient`] for the GraphQL API
#[derive(Debug, Clone)]
pub struct GraphQlClient {
    client: Client,
    url: String,
    queries: GraphQlQueries,
}

impl GraphQlClient {
    /// Create a client for `api` sending `queries`
    pub fn new(api: &ApiConfig, queries: GraphQlQueries, http: &HttpConfig) -> Result<Self, VendorError> {
        let mut headers = Vec::new();
        if let Some(token) = &api.token {
            headers.push((AUTHORIZATION, format!("Bearer {token}")));
        }
        let client = build_client(http, &headers)?;

        Ok(Self {
            client,
            url: api.graphql_url.clone(),
            queries,
        })
    }

    /// POST the document and return the `data` member with the HTTP status
    async fn query(&self, document: &str) -> Result<(u16, Value), Failure> {
        let response = self
            .client
            .post(&self.url)
            .json(&json!({ "query": document }))
            .send()
            .await?;
        let status = response.status();

        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(Failure::http(status));
        }
        let envelope: GraphQlResponse =
            serde_json::from_slice(&body).map_err(|e| Failure::body(status, e))?;
        let data = envelope.into_data()?;
        Ok((status.as_u16(), data))
    }
}

#[async_trait]
impl ApiClient for GraphQlClient {
    fn api_kind(&self) -> ApiKind {
        ApiKind::GraphQl
    }

    /// A successful query records the 2xx status the endpoint returned, which
    /// is 200 for conforming GraphQL servers.
    async fn execute(&self, shape: QueryShape) -> Outcome {
        let start = Instant::now();
        let result = self.query(self.queries.document(shape)).await;
        let elapsed = start.elapsed();

        match result {
            Ok((status, data)) => Outcome::success(elapsed, payload_size(&data), status),
            Err(failure) => {
                tracing::debug!(
                    shape = %shape,
                    status = ?failure.status,
                    error = %failure.message,
                    "GraphQL request failed"
                );
                Outcome::failure(elapsed, failure.status, failure.message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Result<Value, Failure> {
        serde_json::from_str::<GraphQlResponse>(body).unwrap().into_data()
    }

    #[test]
    fn test_data_member_extracted() {
        let data = parse(r#"{"data": {"repository": {"name": "react"}}}"#).unwrap();
        assert_eq!(data["repository"]["name"], "react");
    }

    #[test]
    fn test_errors_fail_without_status() {
        let failure = parse(
            r#"{"data": null, "errors": [{"message": "Could not resolve"}, {"message": "Rate limited"}]}"#,
        )
        .unwrap_err();
        assert_eq!(failure.status, None);
        assert_eq!(failure.message, "GraphQL errors: Could not resolve; Rate limited");
    }

    #[test]
    fn test_errors_win_over_partial_data() {
        let failure = parse(r#"{"data": {"repository": null}, "errors": [{"message": "boom"}]}"#)
            .unwrap_err();
        assert!(failure.message.contains("boom"));
    }

    #[test]
    fn test_missing_or_null_data_fails() {
        assert!(parse(r#"{}"#).is_err());
        assert!(parse(r#"{"data": null}"#).is_err());
    }

    #[test]
    fn test_empty_errors_array_is_success() {
        assert!(parse(r#"{"data": {"viewer": {}}, "errors": []}"#).is_ok());
    }
}
