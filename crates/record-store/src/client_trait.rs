//! # RecordStore Trait
//!
//! The contract every record store backend fulfils: the in-process
//! [`StoreClient`](crate::StoreClient), a mock from [`mock`](crate::mock), or a
//! client for a hosted database. Callers hold an `Arc<dyn RecordStore>` and never
//! learn which one they talk to.
//!
//! Each call stands alone. Backends give no transaction spanning two calls and no
//! compare-and-swap, so callers that read then write must serialize themselves.
use crate::error::StoreError;
use crate::query::{Predicate, Query, Record};
use async_trait::async_trait;

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Reads the rows selected by the query.
    async fn query(&self, query: Query) -> Result<Vec<Record>, StoreError>;

    /// Adds a row and returns it as stored (with generated columns filled in).
    async fn insert(&self, table: &str, record: Record) -> Result<Record, StoreError>;

    /// Removes every row of `table` matching all predicates; returns how many went.
    async fn delete(&self, table: &str, matching: Vec<Predicate>) -> Result<usize, StoreError>;

    /// True when at least one row of `table` matches all predicates.
    #[tracing::instrument(skip(self))]
    async fn exists(&self, table: &str, matching: Vec<Predicate>) -> Result<bool, StoreError> {
        tracing::debug!("Sending request");
        let rows = self
            .query(Query::table(table).filters(matching).limit(1))
            .await?;
        Ok(!rows.is_empty())
    }
}
