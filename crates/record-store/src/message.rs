//! # Store Messages
//!
//! This module defines the messages exchanged between a [`StoreClient`](crate::StoreClient)
//! and the [`StoreActor`](crate::StoreActor).

use crate::error::StoreError;
use crate::query::{Predicate, Query, Record};
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by the store actor.
pub type Response<T> = oneshot::Sender<Result<T, StoreError>>;

/// Request sent to the store actor.
///
/// The three variants mirror the operations a remote record service exposes:
/// read rows, add a row, remove matching rows. Each request is handled on its
/// own; there is no way to group requests into a transaction.
#[derive(Debug)]
pub enum StoreRequest {
    Query {
        query: Query,
        respond_to: Response<Vec<Record>>,
    },
    Insert {
        table: String,
        record: Record,
        respond_to: Response<Record>,
    },
    Delete {
        table: String,
        matching: Vec<Predicate>,
        respond_to: Response<usize>,
    },
}

impl StoreRequest {
    /// Short operation name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreRequest::Query { .. } => "query",
            StoreRequest::Insert { .. } => "insert",
            StoreRequest::Delete { .. } => "delete",
        }
    }
}
