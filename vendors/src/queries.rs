//! Query catalogue
//!
//! Equivalent REST endpoint lists and GraphQL documents for every query
//! shape. The defaults target the `facebook/react` repository on GitHub.

use api_bench_core::QueryShape;
use serde::{Deserialize, Serialize};

use crate::config::ConfigValidationError;

/// REST and GraphQL forms of every query shape
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryCatalog {
    /// REST endpoint paths
    pub rest: RestQueries,
    /// GraphQL documents
    pub graphql: GraphQlQueries,
}

impl QueryCatalog {
    /// Validate every entry of the catalogue
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.rest.validate()?;
        self.graphql.validate()
    }
}

/// REST paths, relative to the configured base URL
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RestQueries {
    /// Single flat resource
    pub simple: String,
    /// Resource with a nested collection
    pub nested: String,
    /// Resources fetched in order and combined into one payload
    pub aggregated: Vec<String>,
}

impl Default for RestQueries {
    fn default() -> Self {
        Self {
            simple: "/repos/facebook/react".to_string(),
            nested: "/repos/facebook/react/issues?state=open&per_page=10".to_string(),
            aggregated: vec![
                "/repos/facebook/react".to_string(),
                "/repos/facebook/react/contributors?per_page=5".to_string(),
                "/repos/facebook/react/languages".to_string(),
            ],
        }
    }
}

impl RestQueries {
    /// Paths issued, in order, for one logical request of `shape`
    pub fn paths(&self, shape: QueryShape) -> Vec<&str> {
        match shape {
            QueryShape::Simple => vec![self.simple.as_str()],
            QueryShape::Nested => vec![self.nested.as_str()],
            QueryShape::Aggregated => self.aggregated.iter().map(String::as_str).collect(),
        }
    }

    fn validate(&self) -> Result<(), ConfigValidationError> {
        for shape in QueryShape::ALL {
            let paths = self.paths(shape);
            if paths.is_empty() {
                return Err(ConfigValidationError::InvalidQuery {
                    shape: shape.as_str(),
                    reason: "REST endpoint list is empty".into(),
                });
            }
            if let Some(bad) = paths.iter().find(|p| !p.starts_with('/')) {
                return Err(ConfigValidationError::InvalidQuery {
                    shape: shape.as_str(),
                    reason: format!("REST path {bad:?} must start with '/'"),
                });
            }
        }
        Ok(())
    }
}

/// GraphQL query documents
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphQlQueries {
    /// Repository scalars
    pub simple: String,
    /// Repository with open issues and their first comments
    pub nested: String,
    /// Repository with languages, collaborators and releases
    pub aggregated: String,
}

const SIMPLE_QUERY: &str = r#"query SimpleQuery {
  repository(owner: "facebook", name: "react") {
    id
    name
    description
    stargazerCount
    forkCount
    createdAt
    updatedAt
  }
}"#;

const NESTED_QUERY: &str = r#"query NestedQuery {
  repository(owner: "facebook", name: "react") {
    id
    name
    description
    stargazerCount
    forkCount
    issues(first: 10, states: OPEN) {
      nodes {
        id
        title
        createdAt
        author { login }
        comments(first: 3) {
          nodes { id body createdAt author { login } }
        }
      }
    }
  }
}"#;

const AGGREGATED_QUERY: &str = r#"query AggregatedQuery {
  repository(owner: "facebook", name: "react") {
    id
    name
    description
    stargazerCount
    forkCount
    languages(first: 10) { nodes { name color } }
    collaborators(first: 5) { nodes { login name avatarUrl } }
    releases(first: 5) { nodes { id name tagName createdAt } }
  }
}"#;

impl Default for GraphQlQueries {
    fn default() -> Self {
        Self {
            simple: SIMPLE_QUERY.to_string(),
            nested: NESTED_QUERY.to_string(),
            aggregated: AGGREGATED_QUERY.to_string(),
        }
    }
}

impl GraphQlQueries {
    /// Document sent for `shape`
    pub fn document(&self, shape: QueryShape) -> &str {
        match shape {
            QueryShape::Simple => &self.simple,
            QueryShape::Nested => &self.nested,
            QueryShape::Aggregated => &self.aggregated,
        }
    }

    fn validate(&self) -> Result<(), ConfigValidationError> {
        for shape in QueryShape::ALL {
            if self.document(shape).trim().is_empty() {
                return Err(ConfigValidationError::InvalidQuery {
                    shape: shape.as_str(),
                    reason: "GraphQL document is empty".into(),
                });
            }
        }
        Ok(())
    }
}
