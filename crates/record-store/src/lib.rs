//! # Record Store
//!
//! This crate is the record-store layer of the marketplace: the contract that the
//! discovery and favorites code uses to read and write table rows, plus an
//! in-process implementation of that contract built as an actor.
//!
//! ## Why an actor?
//!
//! The hosted database behind the marketplace answers each call on its own: a
//! query, an insert or a delete is atomic, but there is no transaction that spans
//! two calls and no compare-and-swap. A single Tokio task that owns every table and
//! processes requests sequentially gives exactly that contract, so the code above
//! it is tested against the same consistency model it meets in production.
//!
//! ## Architecture Overview
//!
//! 1. **Contract** ([`RecordStore`]) - `query`, `insert`, `delete`, and a provided `exists`
//! 2. **Vocabulary** ([`Query`], [`Predicate`], [`OrderBy`], [`Record`]) - what a request says
//! 3. **Runtime** ([`StoreActor`]) - owns the tables, enforces unique constraints
//! 4. **Interface** ([`StoreClient`]) - cheap, cloneable handle implementing [`RecordStore`]
//!
//! ## Quick Start
//!
//! ```rust
//! use record_store::{Predicate, Query, RecordStore, StoreActor, TableSchema};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, client) = StoreActor::new(10, vec![TableSchema::new("properties")]);
//!     tokio::spawn(actor.run());
//!
//!     let row = json!({ "title": "Garden Villa", "status": "available" });
//!     client.insert("properties", row.as_object().unwrap().clone()).await.unwrap();
//!
//!     let found = client
//!         .query(Query::table("properties").filter(Predicate::ilike("title", "villa")))
//!         .await
//!         .unwrap();
//!     assert_eq!(found.len(), 1);
//! }
//! ```
//!
//! ## Testing
//!
//! The [`mock`] module provides [`MockStore`](mock::MockStore) for canned answers
//! and error injection, and channel helpers for holding a request in flight.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod error;
pub mod message;
pub mod mock;
pub mod query;
pub mod schema;

// Re-export core types for convenience
pub use actor::StoreActor;
pub use client::StoreClient;
pub use client_trait::RecordStore;
pub use error::StoreError;
pub use message::{Response, StoreRequest};
pub use query::{OrderBy, Predicate, Query, Record};
pub use schema::TableSchema;
