//! # In-Process Store Actor
//!
//! `StoreActor` is the "Server" half of the in-process record store. It owns every
//! table and processes [`StoreRequest`]s one at a time, so each request is atomic
//! with respect to the others while nothing spans two requests. That is the same
//! contract a remote record service gives its clients.
//!
//! ```rust
//! use record_store::{Predicate, Query, RecordStore, StoreActor, TableSchema};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let schema = TableSchema::new("liked_properties").unique(["user_id", "property_id"]);
//!     let (actor, client) = StoreActor::new(10, vec![schema]);
//!     tokio::spawn(actor.run());
//!
//!     let row = json!({ "user_id": "u1", "property_id": "p1" });
//!     client.insert("liked_properties", row.as_object().unwrap().clone()).await.unwrap();
//!
//!     let duplicate = client.insert("liked_properties", row.as_object().unwrap().clone()).await;
//!     assert!(duplicate.unwrap_err().is_duplicate());
//!
//!     let rows = client
//!         .query(Query::table("liked_properties").filter(Predicate::eq("user_id", "u1")))
//!         .await
//!         .unwrap();
//!     assert_eq!(rows.len(), 1);
//! }
//! ```
//!
//! ## Operations
//!
//! * **Query**: filters the table with every predicate, sorts by the order column
//!   when one is given (insertion order otherwise), then truncates to the limit.
//! * **Insert**: fills in `id` (UUID v4) and `created_at` (RFC 3339, UTC) when the
//!   record does not carry them, checks the implicit `id` key and every unique
//!   column set of the table, then appends the row and returns it.
//! * **Delete**: removes every row matching all predicates and returns the count.

use crate::client::StoreClient;
use crate::error::StoreError;
use crate::message::StoreRequest;
use crate::query::{Predicate, Query, Record};
use crate::schema::TableSchema;
use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

struct Table {
    schema: TableSchema,
    rows: Vec<Record>,
}

impl Table {
    fn conflicting_key(&self, record: &Record) -> Option<String> {
        let id_key = vec!["id".to_string()];
        std::iter::once(&id_key)
            .chain(self.schema.unique.iter())
            .find(|columns| {
                let probe: Option<Vec<Predicate>> = columns
                    .iter()
                    .map(|c| record.get(c).map(|v| Predicate::eq(c.clone(), v.clone())))
                    .collect();
                // A row missing any constrained column cannot conflict on that set.
                probe.is_some_and(|probe| {
                    self.rows
                        .iter()
                        .any(|row| probe.iter().all(|p| p.matches(row)))
                })
            })
            .map(|columns| describe_key(columns, record))
    }
}

fn describe_key(columns: &[String], record: &Record) -> String {
    columns
        .iter()
        .map(|c| {
            let value = record.get(c).cloned().unwrap_or(Value::Null);
            match value {
                Value::String(s) => format!("{c}={s}"),
                other => format!("{c}={other}"),
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// The actor that owns the tables.
pub struct StoreActor {
    receiver: mpsc::Receiver<StoreRequest>,
    tables: HashMap<String, Table>,
}

impl StoreActor {
    /// Creates a new `StoreActor` and its associated `StoreClient`.
    ///
    /// # Arguments
    ///
    /// * `buffer_size` - The capacity of the MPSC channel. If the channel is full,
    ///   calls to the client will wait until there is space. Zero is raised to one.
    /// * `schemas` - The tables this store serves. Requests naming any other table
    ///   fail with [`StoreError::UnknownTable`].
    pub fn new(buffer_size: usize, schemas: Vec<TableSchema>) -> (Self, StoreClient) {
        if buffer_size == 0 {
            warn!("Store buffer size must be positive, using 1");
        }
        let (sender, receiver) = mpsc::channel(buffer_size.max(1));
        let tables = schemas
            .into_iter()
            .map(|schema| {
                (
                    schema.name.clone(),
                    Table {
                        schema,
                        rows: Vec::new(),
                    },
                )
            })
            .collect();
        let actor = Self { receiver, tables };
        (actor, StoreClient::new(sender))
    }

    /// Runs the actor's event loop, processing messages until every client is dropped.
    pub async fn run(mut self) {
        info!(tables = self.tables.len(), "Store started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::Query { query, respond_to } => {
                    debug!(table = %query.table, predicates = ?query.predicates, "Query");
                    let result = self.query(&query);
                    if let Ok(rows) = &result {
                        debug!(table = %query.table, rows = rows.len(), "Query ok");
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::Insert {
                    table,
                    record,
                    respond_to,
                } => {
                    debug!(%table, ?record, "Insert");
                    let result = self.insert(&table, record);
                    match &result {
                        Ok(row) => {
                            let size = self.tables.get(&table).map_or(0, |t| t.rows.len());
                            info!(%table, id = ?row.get("id"), size, "Inserted");
                        }
                        Err(e) => warn!(%table, error = %e, "Insert failed"),
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::Delete {
                    table,
                    matching,
                    respond_to,
                } => {
                    debug!(%table, ?matching, "Delete");
                    let result = self.delete(&table, &matching);
                    match &result {
                        Ok(removed) => info!(%table, removed, "Deleted"),
                        Err(e) => warn!(%table, error = %e, "Delete failed"),
                    }
                    let _ = respond_to.send(result);
                }
            }
        }

        info!("Shutdown");
    }

    fn table(&self, name: &str) -> Result<&Table, StoreError> {
        self.tables
            .get(name)
            .ok_or_else(|| StoreError::UnknownTable(name.to_string()))
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut Table, StoreError> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| StoreError::UnknownTable(name.to_string()))
    }

    fn query(&self, query: &Query) -> Result<Vec<Record>, StoreError> {
        let table = self.table(&query.table)?;
        let mut rows: Vec<Record> = table
            .rows
            .iter()
            .filter(|row| query.matches(row))
            .cloned()
            .collect();
        if let Some(order) = &query.order {
            // Stable sort keeps insertion order among ties.
            rows.sort_by(|a, b| order.compare(a, b));
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    fn insert(&mut self, name: &str, mut record: Record) -> Result<Record, StoreError> {
        let table = self.table_mut(name)?;
        record
            .entry("id")
            .or_insert_with(|| Value::String(uuid::Uuid::new_v4().to_string()));
        record
            .entry("created_at")
            .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));

        if let Some(key) = table.conflicting_key(&record) {
            return Err(StoreError::Duplicate {
                table: name.to_string(),
                key,
            });
        }
        table.rows.push(record.clone());
        Ok(record)
    }

    fn delete(&mut self, name: &str, matching: &[Predicate]) -> Result<usize, StoreError> {
        let table = self.table_mut(name)?;
        let before = table.rows.len();
        table
            .rows
            .retain(|row| !matching.iter().all(|p| p.matches(row)));
        Ok(before - table.rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client_trait::RecordStore;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().expect("object")
    }

    #[tokio::test]
    async fn test_zero_buffer_is_raised() {
        let (actor, client) = StoreActor::new(0, vec![TableSchema::new("properties")]);
        tokio::spawn(actor.run());

        let stored = client
            .insert("properties", record(json!({ "title": "Loft" })))
            .await
            .unwrap();
        assert_eq!(stored["title"], "Loft");
    }

    fn spawn_store() -> StoreClient {
        let schemas = vec![
            TableSchema::new("properties"),
            TableSchema::new("liked_properties").unique(["user_id", "property_id"]),
        ];
        let (actor, client) = StoreActor::new(10, schemas);
        tokio::spawn(actor.run());
        client
    }

    #[tokio::test]
    async fn test_insert_fills_id_and_created_at() {
        let client = spawn_store();

        let row = client
            .insert("properties", record(json!({ "title": "Loft" })))
            .await
            .unwrap();

        assert!(row.get("id").and_then(Value::as_str).is_some());
        let created = row.get("created_at").and_then(Value::as_str).unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(created).is_ok());
    }

    #[tokio::test]
    async fn test_query_filters_orders_and_limits() {
        let client = spawn_store();
        for (id, price, created) in [
            ("a", 100, "2024-01-01T00:00:00Z"),
            ("b", 300, "2024-03-01T00:00:00Z"),
            ("c", 200, "2024-02-01T00:00:00Z"),
        ] {
            client
                .insert(
                    "properties",
                    record(json!({ "id": id, "price": price, "created_at": created })),
                )
                .await
                .unwrap();
        }

        let rows = client
            .query(
                Query::table("properties")
                    .filter(Predicate::gte("price", 150.0))
                    .order_desc("created_at")
                    .limit(5),
            )
            .await
            .unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["b", "c"]);

        let first = client
            .query(Query::table("properties").order_desc("created_at").limit(1))
            .await
            .unwrap();
        assert_eq!(first[0]["id"], "b");
    }

    #[tokio::test]
    async fn test_unique_pair_rejects_duplicate_insert() {
        let client = spawn_store();
        let like = record(json!({ "user_id": "u1", "property_id": "p1" }));

        client.insert("liked_properties", like.clone()).await.unwrap();
        let err = client
            .insert("liked_properties", like)
            .await
            .unwrap_err();

        match err {
            StoreError::Duplicate { table, key } => {
                assert_eq!(table, "liked_properties");
                assert_eq!(key, "user_id=u1, property_id=p1");
            }
            other => panic!("Expected Duplicate, got {other:?}"),
        }

        // A different pair for the same user is fine.
        client
            .insert(
                "liked_properties",
                record(json!({ "user_id": "u1", "property_id": "p2" })),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_removes_only_matching_rows() {
        let client = spawn_store();
        for pid in ["p1", "p2"] {
            client
                .insert(
                    "liked_properties",
                    record(json!({ "user_id": "u1", "property_id": pid })),
                )
                .await
                .unwrap();
        }

        let removed = client
            .delete(
                "liked_properties",
                vec![
                    Predicate::eq("user_id", "u1"),
                    Predicate::eq("property_id", "p1"),
                ],
            )
            .await
            .unwrap();
        assert_eq!(removed, 1);

        let removed_again = client
            .delete(
                "liked_properties",
                vec![
                    Predicate::eq("user_id", "u1"),
                    Predicate::eq("property_id", "p1"),
                ],
            )
            .await
            .unwrap();
        assert_eq!(removed_again, 0);

        let left = client
            .query(Query::table("liked_properties"))
            .await
            .unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0]["property_id"], "p2");
    }

    #[tokio::test]
    async fn test_unknown_table() {
        let client = spawn_store();
        let result = client.query(Query::table("enquiries")).await;
        assert!(matches!(result, Err(StoreError::UnknownTable(t)) if t == "enquiries"));
    }
}
