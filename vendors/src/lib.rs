//! API client implementations for api-bench
//!
//! This crate provides implementations of the `ApiClient` trait for:
//!
//! - REST (one GET per path, aggregated shapes issue several in order)
//! - GraphQL (one POST per query document)
//!
//! plus the endpoint configuration and the query catalogue they draw from.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod graphql;
pub mod http;
pub mod queries;
pub mod rest;

use std::sync::Arc;
use std::time::Duration;

use api_bench_core::ApiClients;
use thiserror::Error;

pub use config::{ApiConfig, ConfigValidationError, TOKEN_ENV_VAR};
pub use graphql::GraphQlClient;
pub use http::{payload_size, HttpConfig};
pub use queries::{GraphQlQueries, QueryCatalog, RestQueries};
pub use rest::RestClient;

/// Errors raised while constructing clients
#[derive(Debug, Error)]
pub enum VendorError {
    /// Configuration failed validation
    #[error(transparent)]
    Config(#[from] ConfigValidationError),

    /// A header value contains characters HTTP forbids
    #[error("invalid value for header {0}")]
    InvalidHeader(String),

    /// The HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Build the REST/GraphQL client pair for an experiment
///
/// Each client owns one connection pool reused across every measurement.
pub fn build_clients(
    api: &ApiConfig,
    queries: &QueryCatalog,
    timeout: Duration,
) -> Result<ApiClients, VendorError> {
    if timeout.is_zero() {
        return Err(ConfigValidationError::InvalidTimeout(timeout).into());
    }
    api.validate()?;
    queries.validate()?;

    let http = HttpConfig::default()
        .with_request_timeout(timeout)
        .with_user_agent(api.user_agent.clone());

    let rest = RestClient::new(api, queries.rest.clone(), &http)?;
    let graphql = GraphQlClient::new(api, queries.graphql.clone(), &http)?;

    tracing::debug!(
        rest_base_url = %api.rest_base_url,
        graphql_url = %api.graphql_url,
        timeout_secs = timeout.as_secs_f64(),
        authenticated = api.token.is_some(),
        "API clients ready"
    );

    Ok(ApiClients::new(Arc::new(rest), Arc::new(graphql)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_clients_defaults() {
        let clients = build_clients(
            &ApiConfig::default(),
            &QueryCatalog::default(),
            Duration::from_secs(30),
        )
        .unwrap();
        let debug = format!("{clients:?}");
        assert!(debug.contains("Rest"));
        assert!(debug.contains("GraphQl"));
    }

    #[test]
    fn test_build_clients_rejects_zero_timeout() {
        let err = build_clients(&ApiConfig::default(), &QueryCatalog::default(), Duration::ZERO)
            .unwrap_err();
        assert!(matches!(
            err,
            VendorError::Config(ConfigValidationError::InvalidTimeout(_))
        ));
    }

    #[test]
    fn test_build_clients_rejects_invalid_catalog() {
        let mut queries = QueryCatalog::default();
        queries.rest.aggregated.clear();
        let err = build_clients(&ApiConfig::default(), &queries, Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, VendorError::Config(_)));
    }

    #[test]
    fn test_build_clients_rejects_malformed_url() {
        let api = ApiConfig {
            rest_base_url: "http://not a host".into(),
            ..Default::default()
        };
        let err = build_clients(&api, &QueryCatalog::default(), Duration::from_secs(1)).unwrap_err();
        assert!(matches!(
            err,
            VendorError::Config(ConfigValidationError::InvalidUrl { field: "rest_base_url", .. })
        ));
    }
}
