//! RecordStore Trait - Storage Adapter Abstraction
//!
//! This module defines the `RecordStore` trait that abstracts persistence of
//! entity records. Each supported backend (libsql, in-memory) implements it
//! once; the `DataContext` selects one implementation at startup and every
//! controller talks to it through the context.
//!
//! # Design Decisions
//!
//! 1. **Async-First**: all operations are async so embedded and network
//!    backends share one surface
//! 2. **Explicit Schema**: every data operation receives the target
//!    `RegisteredSchema`; adapters hold no "current table" state
//! 3. **Adapter-Owned Coercion**: booleans, defaults and column naming are
//!    translated inside the adapter (see `db::coercion`), so callers only
//!    ever see canonical field names and logical booleans
//! 4. **Typed Errors**: all failures are `DatabaseError`, except the liveness
//!    check which reports `false`
//!
//! # Examples
//!
//! ```rust,no_run
//! use taskboard_core::db::{MemoryStore, RecordStore};
//! use taskboard_core::models::{record_from, ITEM};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), taskboard_core::db::DatabaseError> {
//! let store = MemoryStore::new();
//! let schema = store.define_structure(&ITEM).await?;
//!
//! let created = store
//!     .create(&schema, record_from([("parentTaskId", json!(1))]))
//!     .await?;
//! assert_eq!(created["done"], json!(false));
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use std::sync::Arc;

use crate::db::coercion::column_name;
use crate::db::DatabaseError;
use crate::models::{EntityDefinition, Record};

/// Backend-materialized structure for one entity
///
/// Produced by `RecordStore::define_structure` and passed back to every
/// data operation. Owned by the adapter that created it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredSchema {
    /// Entity this structure was derived from
    pub entity: &'static EntityDefinition,

    /// Backend structure name (table)
    pub table: String,

    /// Storage column name for each entity field, in declaration order
    pub columns: Vec<ColumnBinding>,
}

/// Mapping between a canonical field name and its storage column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnBinding {
    pub field: &'static str,
    pub column: String,
}

impl RegisteredSchema {
    /// Build a schema whose columns are the snake_case field names
    pub fn snake_case(entity: &'static EntityDefinition) -> Self {
        Self::with_columns(entity, column_name)
    }

    /// Build a schema whose columns are the canonical field names
    pub fn verbatim(entity: &'static EntityDefinition) -> Self {
        Self::with_columns(entity, str::to_string)
    }

    fn with_columns(entity: &'static EntityDefinition, name: impl Fn(&str) -> String) -> Self {
        Self {
            entity,
            table: entity.table.to_string(),
            columns: entity
                .fields
                .iter()
                .map(|f| ColumnBinding {
                    field: f.name,
                    column: name(f.name),
                })
                .collect(),
        }
    }

    /// Storage column for a canonical field name
    pub fn column(&self, field: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|b| b.field == field)
            .map(|b| b.column.as_str())
    }
}

/// Abstraction layer for record persistence
///
/// Implementations must be `Send + Sync`; one instance is shared by every
/// data context of the process.
///
/// # Method Categories
///
/// - **Lifecycle**: `backend_name`, `is_connected`
/// - **Structure**: `define_structure`, `destroy`
/// - **Core CRUD**: `create`, `read`, `update`, `delete`
/// - **Bulk**: `truncate`
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Registry name of the backend (e.g. `"libsql"`)
    fn backend_name(&self) -> &'static str;

    /// Lightweight liveness check
    ///
    /// Never fails: connectivity problems are logged and reported as `false`.
    async fn is_connected(&self) -> bool;

    /// Create or synchronize the storage structure for an entity
    ///
    /// Idempotent: calling it again for the same entity neither fails nor
    /// duplicates structure.
    async fn define_structure(
        &self,
        entity: &'static EntityDefinition,
    ) -> Result<Arc<RegisteredSchema>, DatabaseError>;

    /// Persist a new record
    ///
    /// # Returns
    ///
    /// The stored record including the generated identifier and every
    /// defaulted field, with logical booleans.
    async fn create(&self, schema: &RegisteredSchema, record: Record)
        -> Result<Record, DatabaseError>;

    /// Read records
    ///
    /// - `None`: every record of the structure
    /// - `Some(query)`: records whose fields equal every field in `query`
    ///
    /// Results are ordered by identifier.
    async fn read(
        &self,
        schema: &RegisteredSchema,
        query: Option<&Record>,
    ) -> Result<Vec<Record>, DatabaseError>;

    /// Apply a sparse update to the record identified by `id`
    ///
    /// The update timestamp is refreshed in the same operation.
    ///
    /// # Returns
    ///
    /// Number of affected records (0 when `id` does not exist).
    async fn update(
        &self,
        schema: &RegisteredSchema,
        id: i64,
        record: Record,
    ) -> Result<u64, DatabaseError>;

    /// Hard delete
    ///
    /// Removes the record identified by `id`, or every record when `id` is
    /// `None`. Returns the number of records removed.
    async fn delete(&self, schema: &RegisteredSchema, id: Option<i64>)
        -> Result<u64, DatabaseError>;

    /// Remove every record and reset identifier generation
    async fn truncate(&self, _schema: &RegisteredSchema) -> Result<u64, DatabaseError> {
        Err(DatabaseError::not_implemented(self.backend_name(), "truncate"))
    }

    /// Drop the storage structure itself
    ///
    /// Schemas obtained before the call are stale afterwards and must be
    /// registered again.
    async fn destroy(&self, _schema: &RegisteredSchema) -> Result<(), DatabaseError> {
        Err(DatabaseError::not_implemented(self.backend_name(), "destroy"))
    }
}
