//! Integration tests for LibsqlStore
//!
//! Tests cover:
//! - Table creation and idempotent registration
//! - Storage representation (snake_case columns, 0/1 booleans)
//! - Persistence across reconnects
//! - Truncate and destroy

use anyhow::Result;
use serde_json::json;
use std::path::PathBuf;
use taskboard_core::{
    config::DatabaseLocation,
    db::{LibsqlStore, RecordStore},
    models::{record_from, RecordExt, ITEM, TASK},
};
use tempfile::TempDir;

/// Test helper: Create a store on a fresh file
async fn create_test_store() -> Result<(LibsqlStore, PathBuf, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("nested").join("test.db");
    let store = LibsqlStore::connect(&DatabaseLocation::Local(db_path.clone())).await?;
    Ok((store, db_path, temp_dir))
}

fn item(task_id: i64) -> taskboard_core::Record {
    record_from([("parentTaskId", json!(task_id))])
}

#[tokio::test]
async fn test_connect_creates_parent_directory() -> Result<()> {
    let (store, db_path, _temp) = create_test_store().await?;

    assert!(db_path.parent().map(|p| p.exists()).unwrap_or(false));
    assert!(store.is_connected().await);
    assert_eq!(store.backend_name(), "libsql");
    Ok(())
}

#[tokio::test]
async fn test_booleans_are_stored_as_bits() -> Result<()> {
    let (store, db_path, _temp) = create_test_store().await?;
    let items = store.define_structure(&ITEM).await?;

    let created = store
        .create(&items, record_from([("parentTaskId", json!(1)), ("done", json!(true))]))
        .await?;
    assert_eq!(created["done"], json!(true));
    assert_eq!(created["excluded"], json!(false));

    // Inspect the raw row through a separate connection
    let db = libsql::Builder::new_local(&db_path).build().await?;
    let conn = db.connect()?;
    let mut rows = conn
        .query(
            "SELECT done, excluded, parent_task_id FROM task_items WHERE id = ?",
            libsql::params![created.id().expect("id")],
        )
        .await?;
    let row = rows.next().await?.expect("row");

    assert_eq!(row.get::<i64>(0)?, 1);
    assert_eq!(row.get::<i64>(1)?, 0);
    assert_eq!(row.get::<i64>(2)?, 1);
    Ok(())
}

#[tokio::test]
async fn test_define_structure_is_idempotent() -> Result<()> {
    let (store, _path, _temp) = create_test_store().await?;
    let first = store.define_structure(&ITEM).await?;
    store.create(&first, item(1)).await?;

    let second = store.define_structure(&ITEM).await?;
    assert_eq!(first, second);
    assert_eq!(store.read(&second, None).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_records_survive_reconnect() -> Result<()> {
    let (store, db_path, _temp) = create_test_store().await?;
    let tasks = store.define_structure(&TASK).await?;
    store
        .create(
            &tasks,
            record_from([("parentAccountId", json!(3)), ("description", json!("persist"))]),
        )
        .await?;
    drop(store);

    let reopened = LibsqlStore::connect(&DatabaseLocation::Local(db_path)).await?;
    let tasks = reopened.define_structure(&TASK).await?;
    let rows = reopened.read(&tasks, None).await?;

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["description"], json!("persist"));
    assert_eq!(rows[0]["title"], json!("New task"));
    assert_eq!(rows[0]["active"], json!(true));
    Ok(())
}

#[tokio::test]
async fn test_null_query_matches_no_required_value() -> Result<()> {
    let (store, _path, _temp) = create_test_store().await?;
    let tasks = store.define_structure(&TASK).await?;
    store
        .create(
            &tasks,
            record_from([("parentAccountId", json!(1)), ("description", json!("d"))]),
        )
        .await?;

    let rows = store
        .read(&tasks, Some(&record_from([("description", json!(null))])))
        .await?;
    assert!(rows.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_truncate_resets_identifiers() -> Result<()> {
    let (store, _path, _temp) = create_test_store().await?;
    let items = store.define_structure(&ITEM).await?;
    for task_id in 1..=3 {
        store.create(&items, item(task_id)).await?;
    }

    assert_eq!(store.truncate(&items).await?, 3);
    let fresh = store.create(&items, item(9)).await?;
    assert_eq!(fresh.id(), Some(1));
    Ok(())
}

#[tokio::test]
async fn test_delete_without_id_keeps_sequence() -> Result<()> {
    let (store, _path, _temp) = create_test_store().await?;
    let items = store.define_structure(&ITEM).await?;
    store.create(&items, item(1)).await?;
    store.create(&items, item(1)).await?;

    assert_eq!(store.delete(&items, None).await?, 2);
    let next = store.create(&items, item(1)).await?;
    assert_eq!(next.id(), Some(3));
    Ok(())
}

#[tokio::test]
async fn test_destroy_drops_table() -> Result<()> {
    let (store, _path, _temp) = create_test_store().await?;
    let items = store.define_structure(&ITEM).await?;
    store.create(&items, item(1)).await?;

    store.destroy(&items).await?;
    assert!(store.read(&items, None).await.is_err());

    // Destroying twice is harmless; registering again starts empty
    store.destroy(&items).await?;
    let items = store.define_structure(&ITEM).await?;
    assert!(store.read(&items, None).await?.is_empty());
    Ok(())
}

#[test]
fn test_in_memory_store_is_private() {
    tokio_test::block_on(async {
        let first = LibsqlStore::in_memory().await.unwrap();
        let second = LibsqlStore::in_memory().await.unwrap();

        let items = first.define_structure(&ITEM).await.unwrap();
        first.create(&items, item(1)).await.unwrap();

        let other = second.define_structure(&ITEM).await.unwrap();
        assert_eq!(first.read(&items, None).await.unwrap().len(), 1);
        assert!(second.read(&other, None).await.unwrap().is_empty());
    });
}
