//! # Store Errors
//!
//! This module defines the error type returned by every record store operation,
//! whether the store is the in-process [`StoreActor`](crate::StoreActor), a mock,
//! or a remote backend implementing [`RecordStore`](crate::RecordStore).

/// Errors that can occur while talking to a record store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store closed")]
    StoreClosed,
    #[error("Store dropped response channel")]
    StoreDropped,
    #[error("Unknown table: {0}")]
    UnknownTable(String),
    /// A unique constraint on the table rejected the insert.
    #[error("Duplicate key in {table}: {key}")]
    Duplicate { table: String, key: String },
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
    #[error("Backend error: {0}")]
    Backend(Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// True when the store refused an insert because the row already exists.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, StoreError::Duplicate { .. })
    }
}
