use record_store::{Predicate, Query, RecordStore, StoreActor, StoreError, TableSchema};
use serde_json::json;

fn liked_schema() -> TableSchema {
    TableSchema::new("liked_properties").unique(["user_id", "property_id"])
}

/// Many tasks racing to insert the same pair: the store keeps exactly one row.
#[tokio::test]
async fn test_concurrent_inserts_keep_pair_unique() {
    let (actor, client) = StoreActor::new(32, vec![liked_schema()]);
    let handle = tokio::spawn(actor.run());

    let mut handles = vec![];
    for _ in 0..10 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            let row = json!({ "user_id": "u1", "property_id": "p1" });
            client
                .insert("liked_properties", row.as_object().cloned().unwrap())
                .await
        }));
    }

    let mut inserted = 0;
    let mut duplicates = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => inserted += 1,
            Err(StoreError::Duplicate { .. }) => duplicates += 1,
            Err(other) => panic!("Unexpected error: {other}"),
        }
    }
    assert_eq!(inserted, 1);
    assert_eq!(duplicates, 9);

    let exists = client
        .exists(
            "liked_properties",
            vec![
                Predicate::eq("user_id", "u1"),
                Predicate::eq("property_id", "p1"),
            ],
        )
        .await
        .unwrap();
    assert!(exists);

    drop(client);
    handle.await.unwrap();
}

/// Once the actor task is gone, requests fail with `StoreClosed` instead of hanging.
#[tokio::test]
async fn test_closed_store_reports_store_closed() {
    let (actor, client) = StoreActor::new(4, vec![liked_schema()]);
    let handle = tokio::spawn(actor.run());
    handle.abort();
    let _ = handle.await;

    let result = client.query(Query::table("liked_properties")).await;
    assert!(matches!(result, Err(StoreError::StoreClosed)));
}
