//! Experiment factors and the treatment enumerator
//!
//! A [`Treatment`] is one combination of API kind, query shape, concurrency
//! level and cache state. [`enumerate`] expands configured factor levels into
//! the full factorial plan, pairing every REST treatment with its GraphQL
//! counterpart, and shuffles the plan so execution order is not confounded
//! with time-dependent effects on the remote side.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which API style a treatment measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ApiKind {
    /// Resource-oriented HTTP API
    #[serde(rename = "REST", alias = "rest")]
    Rest,
    /// Single-endpoint GraphQL API
    #[serde(rename = "GraphQL", alias = "graphql")]
    GraphQl,
}

impl ApiKind {
    /// Both kinds, REST first
    pub const ALL: [ApiKind; 2] = [ApiKind::Rest, ApiKind::GraphQl];

    /// Label written to the results log
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiKind::Rest => "REST",
            ApiKind::GraphQl => "GraphQL",
        }
    }
}

/// Shape of the data requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryShape {
    /// A single flat resource
    Simple,
    /// A resource with nested collections
    Nested,
    /// Several resources combined into one logical request
    Aggregated,
}

impl QueryShape {
    /// All shapes in declaration order
    pub const ALL: [QueryShape; 3] = [QueryShape::Simple, QueryShape::Nested, QueryShape::Aggregated];

    /// Label written to the results log
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryShape::Simple => "simple",
            QueryShape::Nested => "nested",
            QueryShape::Aggregated => "aggregated",
        }
    }
}

/// Whether downstream caches are expected to be primed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheState {
    /// No warmup before measuring
    Cold,
    /// Warmup requests run before measuring
    Warm,
}

impl CacheState {
    /// Both states, cold first
    pub const ALL: [CacheState; 2] = [CacheState::Cold, CacheState::Warm];

    /// Label written to the results log
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheState::Cold => "cold",
            CacheState::Warm => "warm",
        }
    }

    /// Whether a warmup phase precedes measurement
    pub fn is_warm(&self) -> bool {
        matches!(self, CacheState::Warm)
    }
}

macro_rules! display_and_parse {
    ($ty:ty, $what:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ParseFactorError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty>::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
                    .ok_or_else(|| ParseFactorError {
                        factor: $what,
                        value: s.to_string(),
                    })
            }
        }
    };
}

display_and_parse!(ApiKind, "api kind");
display_and_parse!(QueryShape, "query shape");
display_and_parse!(CacheState, "cache state");

/// Unrecognized factor level
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {factor}: {value:?}")]
pub struct ParseFactorError {
    factor: &'static str,
    value: String,
}

/// One fixed combination of experiment factors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Treatment {
    /// API style under test
    pub api_kind: ApiKind,
    /// Query shape under test
    pub query_shape: QueryShape,
    /// Number of simultaneous workers
    pub concurrency_level: usize,
    /// Cache warmth
    pub cache_state: CacheState,
}

impl Treatment {
    /// Create a treatment
    pub fn new(
        api_kind: ApiKind,
        query_shape: QueryShape,
        concurrency_level: usize,
        cache_state: CacheState,
    ) -> Self {
        Self {
            api_kind,
            query_shape,
            concurrency_level,
            cache_state,
        }
    }

    /// The same condition measured against the other API kind
    pub fn counterpart(&self) -> Self {
        let api_kind = match self.api_kind {
            ApiKind::Rest => ApiKind::GraphQl,
            ApiKind::GraphQl => ApiKind::Rest,
        };
        Self { api_kind, ..*self }
    }
}

impl fmt::Display for Treatment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} (cache={}, cc={})",
            self.api_kind, self.query_shape, self.cache_state, self.concurrency_level
        )
    }
}

/// Configured levels for each factor (API kind is always both)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Factors {
    /// Query shapes to measure
    pub query_shapes: Vec<QueryShape>,
    /// Worker counts to measure
    pub concurrency_levels: Vec<usize>,
    /// Cache states to measure
    pub cache_states: Vec<CacheState>,
}

impl Factors {
    /// Number of treatments [`enumerate`] will produce
    pub fn treatment_count(&self) -> usize {
        self.query_shapes.len()
            * self.concurrency_levels.len()
            * self.cache_states.len()
            * ApiKind::ALL.len()
    }
}

/// Expand factor levels into the shuffled treatment plan
///
/// With `Some(seed)` the order is reproducible; with `None` it is drawn from
/// OS entropy. Either way the result is a permutation of the same multiset.
pub fn enumerate(factors: &Factors, seed: Option<u64>) -> Vec<Treatment> {
    let mut treatments = Vec::with_capacity(factors.treatment_count());

    for &shape in &factors.query_shapes {
        for &level in &factors.concurrency_levels {
            for &cache in &factors.cache_states {
                let rest = Treatment::new(ApiKind::Rest, shape, level, cache);
                treatments.push(rest);
                treatments.push(rest.counterpart());
            }
        }
    }

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    treatments.shuffle(&mut rng);

    treatments
}
