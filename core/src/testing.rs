//! Mock API clients shared by the engine tests

use crate::outcome::Outcome;
use crate::traits::{ApiClient, ApiClients};
use crate::treatment::{ApiKind, QueryShape};

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub(crate) enum Behavior {
    /// Succeed with a fixed payload size
    Succeed,
    /// Fail every call with a transport error (status 0)
    Unreachable,
    /// Fail every `n`th call with HTTP 500
    FailEvery(usize),
    /// Panic inside the worker task
    Panic,
}

pub(crate) struct MockClient {
    kind: ApiKind,
    behavior: Behavior,
    delay: Option<Duration>,
    calls: AtomicUsize,
    shapes: Mutex<Vec<QueryShape>>,
}

impl MockClient {
    pub(crate) fn new(kind: ApiKind, behavior: Behavior) -> Self {
        Self {
            kind,
            behavior,
            delay: None,
            calls: AtomicUsize::new(0),
            shapes: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn shapes(&self) -> Vec<QueryShape> {
        self.shapes.lock().unwrap().clone()
    }
}

#[async_trait]
impl ApiClient for MockClient {
    fn api_kind(&self) -> ApiKind {
        self.kind
    }

    async fn execute(&self, shape: QueryShape) -> Outcome {
        let count = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.shapes.lock().unwrap().push(shape);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let elapsed = self.delay.unwrap_or(Duration::from_millis(3));

        match self.behavior {
            Behavior::Succeed => Outcome::success(elapsed, 256, 200),
            Behavior::Unreachable => {
                Outcome::failure(elapsed, None, "error sending request: connection refused")
            }
            Behavior::FailEvery(n) if count % n == 0 => {
                Outcome::failure(elapsed, Some(500), "500 Internal Server Error")
            }
            Behavior::FailEvery(_) => Outcome::success(elapsed, 256, 200),
            Behavior::Panic => panic!("simulated worker crash"),
        }
    }
}

/// Pair of mocks plus typed handles for call counting
pub(crate) fn mock_clients(
    rest: MockClient,
    graphql: MockClient,
) -> (ApiClients, Arc<MockClient>, Arc<MockClient>) {
    let rest = Arc::new(rest);
    let graphql = Arc::new(graphql);
    let clients = ApiClients::new(rest.clone(), graphql.clone());
    (clients, rest, graphql)
}

/// Read a results log back as (header, rows)
pub(crate) fn read_log(path: &std::path::Path) -> (csv::StringRecord, Vec<csv::StringRecord>) {
    let mut reader = csv::Reader::from_path(path).expect("open results log");
    let header = reader.headers().expect("header row").clone();
    let rows = reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .expect("well-formed rows");
    (header, rows)
}
