//! # Store Client
//!
//! This module defines the handle used to talk to a [`StoreActor`](crate::StoreActor).

use crate::client_trait::RecordStore;
use crate::error::StoreError;
use crate::message::StoreRequest;
use crate::query::{Predicate, Query, Record};
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

/// ## StoreClient
///
/// Forwards requests over a Tokio mpsc channel and receives results via oneshot
/// channels. It holds only a sender, so cloning is inexpensive and clones can be
/// shared across tasks. Dropping the last clone shuts the actor down.
#[derive(Clone)]
pub struct StoreClient {
    sender: mpsc::Sender<StoreRequest>,
}

impl StoreClient {
    pub fn new(sender: mpsc::Sender<StoreRequest>) -> Self {
        Self { sender }
    }

    async fn send<T>(
        &self,
        request: StoreRequest,
        response: oneshot::Receiver<Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        self.sender
            .send(request)
            .await
            .map_err(|_| StoreError::StoreClosed)?;
        response.await.map_err(|_| StoreError::StoreDropped)?
    }
}

#[async_trait]
impl RecordStore for StoreClient {
    #[instrument(skip(self), fields(table = %query.table))]
    async fn query(&self, query: Query) -> Result<Vec<Record>, StoreError> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        self.send(StoreRequest::Query { query, respond_to }, response)
            .await
    }

    #[instrument(skip(self, record))]
    async fn insert(&self, table: &str, record: Record) -> Result<Record, StoreError> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        let request = StoreRequest::Insert {
            table: table.to_string(),
            record,
            respond_to,
        };
        self.send(request, response).await
    }

    #[instrument(skip(self))]
    async fn delete(&self, table: &str, matching: Vec<Predicate>) -> Result<usize, StoreError> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        let request = StoreRequest::Delete {
            table: table.to_string(),
            matching,
            respond_to,
        };
        self.send(request, response).await
    }
}
