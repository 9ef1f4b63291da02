//! API endpoint configuration
//!
//! This module provides the endpoint and credential settings shared by the
//! REST and GraphQL clients, plus their validation.

use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable the CLI reads the API token from.
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

/// Configuration validation error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// A required configuration field is missing.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A URL field is not an absolute http(s) URL.
    #[error("invalid URL for {field}: {value:?}")]
    InvalidUrl {
        /// Offending field
        field: &'static str,
        /// Configured value
        value: String,
    },

    /// A timeout value is out of acceptable range.
    #[error("invalid timeout: {0:?}")]
    InvalidTimeout(Duration),

    /// A catalogue entry cannot be issued.
    #[error("invalid query for {shape}: {reason}")]
    InvalidQuery {
        /// Query shape label
        shape: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

// ============================================================================
// API Configuration
// ============================================================================

fn default_rest_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_graphql_url() -> String {
    "https://api.github.com/graphql".to_string()
}

fn default_user_agent() -> String {
    "GraphQL-vs-REST-Experiment".to_string()
}

/// Endpoints and credentials of the API under test.
///
/// The token is never read from or written to configuration files; the CLI
/// injects it from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL prepended to every REST path
    #[serde(default = "default_rest_base_url")]
    pub rest_base_url: String,

    /// GraphQL endpoint URL
    #[serde(default = "default_graphql_url")]
    pub graphql_url: String,

    /// User-Agent header sent by both clients
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// API token, sent as `token` (REST) or `Bearer` (GraphQL)
    #[serde(skip)]
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            rest_base_url: default_rest_base_url(),
            graphql_url: default_graphql_url(),
            user_agent: default_user_agent(),
            token: None,
        }
    }
}

impl ApiConfig {
    /// Point both clients at a single server (REST at its root, GraphQL at `/graphql`).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        self.rest_base_url = base.to_string();
        self.graphql_url = format!("{base}/graphql");
        self
    }

    /// Set the API token; empty tokens are treated as absent.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        check_url("rest_base_url", &self.rest_base_url)?;
        check_url("graphql_url", &self.graphql_url)?;
        if self.user_agent.trim().is_empty() {
            return Err(ConfigValidationError::MissingField("user_agent"));
        }
        Ok(())
    }
}

fn check_url(field: &'static str, value: &str) -> Result<(), ConfigValidationError> {
    let invalid = || ConfigValidationError::InvalidUrl {
        field,
        value: value.to_string(),
    };

    let url = Url::parse(value).map_err(|_| invalid())?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(()),
        _ => Err(invalid()),
    }
}

// ============================================================================
// Tests
// ============================================================================
