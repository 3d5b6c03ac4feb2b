//! Table names and schemas of the marketplace store.

use record_store::TableSchema;

pub const PROPERTIES: &str = "properties";

/// Join table with columns `user_id` and `property_id`.
pub const LIKED_PROPERTIES: &str = "liked_properties";

/// Schemas for an in-process store. The pair constraint on `liked_properties` is
/// the storage-level backstop for favorite uniqueness.
pub fn schemas() -> Vec<TableSchema> {
    vec![
        TableSchema::new(PROPERTIES),
        TableSchema::new(LIKED_PROPERTIES).unique(["user_id", "property_id"]),
    ]
}
