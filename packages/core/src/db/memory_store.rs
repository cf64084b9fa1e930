//! MemoryStore - RecordStore Implementation Backed by Process Memory
//!
//! Tables live in a `tokio::sync::RwLock`-guarded map and disappear with the
//! process. Records are kept in the same storage representation the SQL
//! backend uses (booleans as `0`/`1`), so both backends go through the exact
//! same coercion path.
//!
//! Used for tests and ephemeral runs (`TASKBOARD_DATABASE=memory`).

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::db::coercion::{self, StorageValues};
use crate::db::record_store::{RecordStore, RegisteredSchema};
use crate::db::DatabaseError;
use crate::models::{EntityDefinition, Record, ID_FIELD};

/// Registry name of this backend
pub const MEMORY_BACKEND: &str = "memory";

#[derive(Debug, Default)]
struct Table {
    /// Last identifier handed out; never reused until truncation
    last_id: i64,
    rows: BTreeMap<i64, Record>,
}

/// In-memory backend
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Table>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn missing_table(schema: &RegisteredSchema) -> DatabaseError {
        DatabaseError::sql_execution(format!("no such table: {}", schema.table))
    }

    fn matches(row: &Record, query: &StorageValues) -> bool {
        query
            .iter()
            .all(|(field, expected)| row.get(field.name).unwrap_or(&Value::Null) == expected)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        MEMORY_BACKEND
    }

    async fn is_connected(&self) -> bool {
        true
    }

    async fn define_structure(
        &self,
        entity: &'static EntityDefinition,
    ) -> Result<Arc<RegisteredSchema>, DatabaseError> {
        let schema = RegisteredSchema::verbatim(entity);
        self.tables
            .write()
            .await
            .entry(schema.table.clone())
            .or_default();

        tracing::debug!(entity = entity.name, table = %schema.table, "memory table ready");
        Ok(Arc::new(schema))
    }

    async fn create(
        &self,
        schema: &RegisteredSchema,
        record: Record,
    ) -> Result<Record, DatabaseError> {
        let now = coercion::now_timestamp();
        let values = coercion::prepare_insert(schema.entity, record, &now)?;

        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(&schema.table)
            .ok_or_else(|| Self::missing_table(schema))?;

        table.last_id += 1;
        let id = table.last_id;

        let mut row: Record = values
            .into_iter()
            .map(|(field, value)| (field.name.to_string(), value))
            .collect();
        row.insert(ID_FIELD.to_string(), Value::from(id));
        table.rows.insert(id, row.clone());

        Ok(coercion::from_storage(schema.entity, row))
    }

    async fn read(
        &self,
        schema: &RegisteredSchema,
        query: Option<&Record>,
    ) -> Result<Vec<Record>, DatabaseError> {
        let query = match query {
            Some(q) => coercion::prepare_query(schema.entity, q)?,
            None => Vec::new(),
        };

        let tables = self.tables.read().await;
        let table = tables
            .get(&schema.table)
            .ok_or_else(|| Self::missing_table(schema))?;

        Ok(table
            .rows
            .values()
            .filter(|row| Self::matches(row, &query))
            .map(|row| coercion::from_storage(schema.entity, row.clone()))
            .collect())
    }

    async fn update(
        &self,
        schema: &RegisteredSchema,
        id: i64,
        record: Record,
    ) -> Result<u64, DatabaseError> {
        let now = coercion::now_timestamp();
        let values = coercion::prepare_update(schema.entity, record, &now)?;

        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(&schema.table)
            .ok_or_else(|| Self::missing_table(schema))?;

        match table.rows.get_mut(&id) {
            Some(row) => {
                for (field, value) in values {
                    row.insert(field.name.to_string(), value);
                }
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(
        &self,
        schema: &RegisteredSchema,
        id: Option<i64>,
    ) -> Result<u64, DatabaseError> {
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(&schema.table)
            .ok_or_else(|| Self::missing_table(schema))?;

        let removed = match id {
            Some(id) => u64::from(table.rows.remove(&id).is_some()),
            None => {
                let count = table.rows.len() as u64;
                table.rows.clear();
                count
            }
        };
        Ok(removed)
    }

    async fn truncate(&self, schema: &RegisteredSchema) -> Result<u64, DatabaseError> {
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(&schema.table)
            .ok_or_else(|| Self::missing_table(schema))?;

        let count = table.rows.len() as u64;
        *table = Table::default();
        Ok(count)
    }

    async fn destroy(&self, schema: &RegisteredSchema) -> Result<(), DatabaseError> {
        self.tables.write().await.remove(&schema.table);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{record_from, RecordExt, ITEM, TASK};
    use serde_json::json;

    fn item(task_id: i64) -> Record {
        record_from([("parentTaskId", json!(task_id))])
    }

    #[tokio::test]
    async fn test_ids_are_sequential_per_table() {
        let store = MemoryStore::new();
        let items = store.define_structure(&ITEM).await.unwrap();
        let tasks = store.define_structure(&TASK).await.unwrap();

        let first = store.create(&items, item(1)).await.unwrap();
        let second = store.create(&items, item(1)).await.unwrap();
        let task = store
            .create(
                &tasks,
                record_from([("parentAccountId", json!(1)), ("description", json!("d"))]),
            )
            .await
            .unwrap();

        assert_eq!(first.id(), Some(1));
        assert_eq!(second.id(), Some(2));
        assert_eq!(task.id(), Some(1));
    }

    #[tokio::test]
    async fn test_rows_are_stored_as_bits() {
        let store = MemoryStore::new();
        let items = store.define_structure(&ITEM).await.unwrap();
        store.create(&items, item(1)).await.unwrap();

        let tables = store.tables.read().await;
        let raw = tables["task_items"].rows.get(&1).unwrap();
        assert_eq!(raw["excluded"], json!(0));
    }

    #[tokio::test]
    async fn test_define_structure_keeps_existing_rows() {
        let store = MemoryStore::new();
        let items = store.define_structure(&ITEM).await.unwrap();
        store.create(&items, item(1)).await.unwrap();

        let again = store.define_structure(&ITEM).await.unwrap();
        assert_eq!(store.read(&again, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_operations_on_destroyed_table_fail() {
        let store = MemoryStore::new();
        let items = store.define_structure(&ITEM).await.unwrap();
        store.destroy(&items).await.unwrap();

        let result = store.read(&items, None).await;
        assert!(matches!(result, Err(DatabaseError::SqlExecutionError { .. })));
    }
}
