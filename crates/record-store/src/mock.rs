//! # Mock Store & Testing Guide
//!
//! `MockStore` hands out a real [`StoreClient`] whose requests are answered from a
//! queue of expectations instead of tables. Use it to test code that sits on top
//! of a [`RecordStore`](crate::RecordStore) without caring about stored data, and
//! above all to inject failures that the in-process store never produces.
//!
//! ## When to use which
//!
//! | Need | Tool |
//! |------|------|
//! | Canned answers, error injection, "nothing was sent" checks | [`MockStore`] |
//! | Holding a request in flight to test interleavings | [`create_mock_store`] + [`expect_query`] / [`expect_insert`] / [`expect_delete`] |
//! | Real filtering, ordering and unique constraints | [`StoreActor`](crate::StoreActor) |
//!
//! ## Fluent expectations
//!
//! ```rust
//! use record_store::mock::MockStore;
//! use record_store::{Query, RecordStore, StoreError};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockStore::new();
//!     mock.expect_query().return_ok(Vec::new());
//!     mock.expect_query()
//!         .return_err(StoreError::Backend("connection reset".into()));
//!
//!     let client = mock.client();
//!     assert!(client.query(Query::table("properties")).await.unwrap().is_empty());
//!     assert!(client.query(Query::table("properties")).await.is_err());
//!
//!     mock.verify();
//! }
//! ```
//!
//! ## Holding a request in flight
//!
//! ```rust
//! use record_store::mock::{create_mock_store, expect_insert};
//! use record_store::RecordStore;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (client, mut receiver) = create_mock_store(10);
//!     let task = tokio::spawn(async move {
//!         client.insert("liked_properties", Default::default()).await
//!     });
//!
//!     let (table, record, responder) = expect_insert(&mut receiver).await.unwrap();
//!     assert_eq!(table, "liked_properties");
//!     // ... assert on whatever else is (or is not) happening meanwhile ...
//!     responder.send(Ok(record)).unwrap();
//!
//!     assert!(task.await.unwrap().is_ok());
//! }
//! ```

use crate::client::StoreClient;
use crate::error::StoreError;
use crate::message::StoreRequest;
use crate::query::{Predicate, Query, Record};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

enum Expectation {
    Query {
        response: Result<Vec<Record>, StoreError>,
    },
    Insert {
        response: Result<Record, StoreError>,
    },
    Delete {
        response: Result<usize, StoreError>,
    },
}

/// A request the mock received, kept for assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum Received {
    Query(Query),
    Insert { table: String, record: Record },
    Delete { table: String, matching: Vec<Predicate> },
}

type Shared<T> = Arc<Mutex<T>>;

/// A mock store with expectation tracking for fluent testing.
///
/// Requests are answered strictly in the order expectations were registered. A
/// request that does not match the next expectation (or arrives when none is
/// left) gets its response channel dropped, so the caller sees
/// [`StoreError::StoreDropped`], and [`MockStore::verify`] panics afterwards.
pub struct MockStore {
    client: StoreClient,
    expectations: Shared<VecDeque<Expectation>>,
    received: Shared<Vec<Received>>,
    mismatches: Shared<Vec<String>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStore {
    /// Creates a new mock store with no expectations.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<StoreRequest>(100);
        let expectations: Shared<VecDeque<Expectation>> = Arc::default();
        let received: Shared<Vec<Received>> = Arc::default();
        let mismatches: Shared<Vec<String>> = Arc::default();

        let (exps, log, errors) = (expectations.clone(), received.clone(), mismatches.clone());
        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let kind = request.kind();
                let expectation = lock(&exps).pop_front();

                match (request, expectation) {
                    (StoreRequest::Query { query, respond_to }, Some(Expectation::Query { response })) => {
                        lock(&log).push(Received::Query(query));
                        let _ = respond_to.send(response);
                    }
                    (
                        StoreRequest::Insert {
                            table,
                            record,
                            respond_to,
                        },
                        Some(Expectation::Insert { response }),
                    ) => {
                        lock(&log).push(Received::Insert { table, record });
                        let _ = respond_to.send(response);
                    }
                    (
                        StoreRequest::Delete {
                            table,
                            matching,
                            respond_to,
                        },
                        Some(Expectation::Delete { response }),
                    ) => {
                        lock(&log).push(Received::Delete { table, matching });
                        let _ = respond_to.send(response);
                    }
                    (_, expectation) => {
                        let wanted = match expectation {
                            Some(Expectation::Query { .. }) => "query",
                            Some(Expectation::Insert { .. }) => "insert",
                            Some(Expectation::Delete { .. }) => "delete",
                            None => "nothing",
                        };
                        lock(&errors).push(format!("unexpected {kind}, expected {wanted}"));
                    }
                }
            }
        });

        Self {
            client: StoreClient::new(sender),
            expectations,
            received,
            mismatches,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> StoreClient {
        self.client.clone()
    }

    /// Expects a `query` operation.
    pub fn expect_query(&mut self) -> ExpectationBuilder<Vec<Record>> {
        ExpectationBuilder::new(self.expectations.clone(), |response| {
            Expectation::Query { response }
        })
    }

    /// Expects an `insert` operation.
    pub fn expect_insert(&mut self) -> ExpectationBuilder<Record> {
        ExpectationBuilder::new(self.expectations.clone(), |response| {
            Expectation::Insert { response }
        })
    }

    /// Expects a `delete` operation.
    pub fn expect_delete(&mut self) -> ExpectationBuilder<usize> {
        ExpectationBuilder::new(self.expectations.clone(), |response| {
            Expectation::Delete { response }
        })
    }

    /// Every request answered so far, in arrival order.
    pub fn received(&self) -> Vec<Received> {
        lock(&self.received).clone()
    }

    /// Verifies that all expectations were met and nothing unexpected arrived.
    pub fn verify(&self) {
        let errors = lock(&self.mismatches);
        if !errors.is_empty() {
            panic!("Mock store received unexpected requests: {errors:?}");
        }
        let exps = lock(&self.expectations);
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    // A panicking test thread must not hide the mock's own bookkeeping.
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Builder for a single expectation.
pub struct ExpectationBuilder<T> {
    expectations: Shared<VecDeque<Expectation>>,
    wrap: fn(Result<T, StoreError>) -> Expectation,
}

impl<T> ExpectationBuilder<T> {
    fn new(
        expectations: Shared<VecDeque<Expectation>>,
        wrap: fn(Result<T, StoreError>) -> Expectation,
    ) -> Self {
        Self { expectations, wrap }
    }

    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: T) {
        lock(&self.expectations).push_back((self.wrap)(Ok(value)));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: StoreError) {
        lock(&self.expectations).push_back((self.wrap)(Err(error)));
    }
}

// =============================================================================
// CHANNEL HELPERS
// =============================================================================

/// Creates a store client and the receiver its requests arrive on.
///
/// Nothing answers the requests until the test does, which makes it possible to
/// keep one request in flight while checking what other tasks do meanwhile.
pub fn create_mock_store(buffer_size: usize) -> (StoreClient, mpsc::Receiver<StoreRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (StoreClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Query request.
pub async fn expect_query(
    receiver: &mut mpsc::Receiver<StoreRequest>,
) -> Option<(Query, oneshot::Sender<Result<Vec<Record>, StoreError>>)> {
    match receiver.recv().await {
        Some(StoreRequest::Query { query, respond_to }) => Some((query, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Insert request.
pub async fn expect_insert(
    receiver: &mut mpsc::Receiver<StoreRequest>,
) -> Option<(String, Record, oneshot::Sender<Result<Record, StoreError>>)> {
    match receiver.recv().await {
        Some(StoreRequest::Insert {
            table,
            record,
            respond_to,
        }) => Some((table, record, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Delete request.
pub async fn expect_delete(
    receiver: &mut mpsc::Receiver<StoreRequest>,
) -> Option<(
    String,
    Vec<Predicate>,
    oneshot::Sender<Result<usize, StoreError>>,
)> {
    match receiver.recv().await {
        Some(StoreRequest::Delete {
            table,
            matching,
            respond_to,
        }) => Some((table, matching, respond_to)),
        _ => None,
    }
}
