//! LibsqlStore - RecordStore Implementation for the libsql Backend
//!
//! Binds the generic record operations to a libsql database, either an
//! embedded SQLite-compatible file or a remote libsql/Turso endpoint.
//!
//! # Storage Layout
//!
//! One table per entity, created from the entity definition:
//!
//! - canonical camelCase field names become snake_case columns
//! - `Integer` and `Boolean` fields are `INTEGER` columns (booleans as 0/1)
//! - `Text` fields are `VARCHAR(n)` or `TEXT`, timestamps are `TEXT`
//! - an auto-increment primary key becomes `INTEGER PRIMARY KEY AUTOINCREMENT`
//!
//! # Connection Handling
//!
//! The store opens a single connection at `connect()` time and reuses it for
//! every statement, so `:memory:` databases keep their tables across calls.
//! A 5-second busy timeout makes concurrent writers wait instead of failing
//! with `SQLITE_BUSY`.
//!
//! # Examples
//!
//! ```rust,no_run
//! use taskboard_core::config::DatabaseLocation;
//! use taskboard_core::db::{LibsqlStore, RecordStore};
//! use taskboard_core::models::ACCOUNT;
//! use std::path::PathBuf;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), taskboard_core::db::DatabaseError> {
//!     let location = DatabaseLocation::Local(PathBuf::from("./data/taskboard.db"));
//!     let store = LibsqlStore::connect(&location).await?;
//!     let accounts = store.define_structure(&ACCOUNT).await?;
//!     println!("{} rows", store.read(&accounts, None).await?.len());
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use libsql::params::Params;
use libsql::{Builder, Connection, Database, Row};
use serde_json::{Number, Value};
use std::sync::Arc;

use crate::config::DatabaseLocation;
use crate::db::coercion::{self, StorageValues};
use crate::db::record_store::{RecordStore, RegisteredSchema};
use crate::db::DatabaseError;
use crate::models::{DefaultValue, EntityDefinition, FieldDescriptor, FieldType, Record};

/// Registry name of this backend
pub const LIBSQL_BACKEND: &str = "libsql";

/// libsql backend
pub struct LibsqlStore {
    /// Kept alive for the lifetime of the connection
    _db: Database,
    conn: Connection,
    target: String,
}

impl std::fmt::Debug for LibsqlStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibsqlStore")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl LibsqlStore {
    /// Open the database and its connection
    ///
    /// For local files the parent directory is created when missing and WAL
    /// journaling is enabled. Failures are reported as
    /// `DatabaseError::ConnectionFailed` and never retried.
    pub async fn connect(location: &DatabaseLocation) -> Result<Self, DatabaseError> {
        let target = location.to_string();

        let db = match location {
            DatabaseLocation::Local(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() && !parent.exists() {
                        std::fs::create_dir_all(parent).map_err(|e| {
                            DatabaseError::sql_execution(format!(
                                "Failed to create database directory {}: {}",
                                parent.display(),
                                e
                            ))
                        })?;
                    }
                }
                Builder::new_local(path).build().await
            }
            DatabaseLocation::Remote { url, auth_token } => {
                Builder::new_remote(url.clone(), auth_token.clone())
                    .build()
                    .await
            }
        }
        .map_err(|e| DatabaseError::connection_failed(target.clone(), e))?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::connection_failed(target.clone(), e))?;

        let store = Self {
            _db: db,
            conn,
            target,
        };

        if let DatabaseLocation::Local(path) = location {
            store.execute_pragma("PRAGMA busy_timeout = 5000").await?;
            if path.as_os_str() != ":memory:" {
                store.execute_pragma("PRAGMA journal_mode = WAL").await?;
            }
        }

        tracing::info!(target = %store.target, "libsql store connected");
        Ok(store)
    }

    /// Open a private in-memory database
    pub async fn in_memory() -> Result<Self, DatabaseError> {
        Self::connect(&DatabaseLocation::Local(":memory:".into())).await
    }

    /// Execute a PRAGMA statement
    ///
    /// PRAGMA statements may return rows, so they go through `query()`.
    async fn execute_pragma(&self, pragma: &str) -> Result<(), DatabaseError> {
        self.conn.query(pragma, ()).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        Ok(())
    }

    fn quote(identifier: &str) -> String {
        format!("\"{}\"", identifier.replace('"', "\"\""))
    }

    fn column_list(schema: &RegisteredSchema) -> String {
        schema
            .columns
            .iter()
            .map(|b| Self::quote(&b.column))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Column identifying a single row
    fn key_column(schema: &RegisteredSchema) -> String {
        schema
            .entity
            .primary_key()
            .and_then(|pk| schema.column(pk.name))
            .map(Self::quote)
            .unwrap_or_else(|| "rowid".to_string())
    }

    fn column_of(schema: &RegisteredSchema, field: &FieldDescriptor) -> Result<String, DatabaseError> {
        schema
            .column(field.name)
            .map(Self::quote)
            .ok_or_else(|| DatabaseError::unknown_field(schema.entity.name, field.name))
    }

    /// DDL for one column
    fn column_definition(column: &str, field: &FieldDescriptor) -> String {
        let sql_type = match field.field_type {
            FieldType::Integer | FieldType::Boolean => "INTEGER".to_string(),
            FieldType::Text { max_len: Some(n) } => format!("VARCHAR({})", n),
            FieldType::Text { max_len: None } | FieldType::Timestamp => "TEXT".to_string(),
        };

        let mut ddl = format!("{} {}", Self::quote(column), sql_type);
        if field.primary_key {
            ddl.push_str(" PRIMARY KEY");
            if field.auto_increment {
                ddl.push_str(" AUTOINCREMENT");
            }
        } else if !field.nullable {
            ddl.push_str(" NOT NULL");
        }

        match field.default {
            Some(DefaultValue::Bool(b)) => ddl.push_str(&format!(" DEFAULT {}", i64::from(b))),
            Some(DefaultValue::Integer(n)) => ddl.push_str(&format!(" DEFAULT {}", n)),
            Some(DefaultValue::Text(s)) => {
                ddl.push_str(&format!(" DEFAULT '{}'", s.replace('\'', "''")))
            }
            // Filled with the RFC 3339 instant by the coercion layer
            Some(DefaultValue::Now) | None => {}
        }

        ddl
    }

    fn create_table_sql(schema: &RegisteredSchema) -> String {
        let columns = schema
            .entity
            .fields
            .iter()
            .zip(&schema.columns)
            .map(|(field, binding)| Self::column_definition(&binding.column, field))
            .collect::<Vec<_>>()
            .join(",\n    ");

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
            Self::quote(&schema.table),
            columns
        )
    }

    /// Build `WHERE` clause and its parameters from prepared query values
    fn where_clause(
        schema: &RegisteredSchema,
        query: StorageValues,
    ) -> Result<(String, Vec<libsql::Value>), DatabaseError> {
        if query.is_empty() {
            return Ok((String::new(), Vec::new()));
        }

        let mut predicates = Vec::with_capacity(query.len());
        let mut params = Vec::with_capacity(query.len());
        for (field, value) in query {
            let column = Self::column_of(schema, field)?;
            if value.is_null() {
                predicates.push(format!("{} IS NULL", column));
            } else {
                predicates.push(format!("{} = ?", column));
                params.push(to_sql_value(schema, field, value)?);
            }
        }

        Ok((format!(" WHERE {}", predicates.join(" AND ")), params))
    }

    /// Convert a result row (selected with `column_list`) into a record
    fn decode_row(schema: &RegisteredSchema, row: &Row) -> Result<Record, DatabaseError> {
        let mut record = Record::new();
        for (idx, binding) in schema.columns.iter().enumerate() {
            let value = row
                .get_value(idx as i32)
                .map_err(|e| DatabaseError::row_decoding(&schema.table, e.to_string()))?;
            record.insert(binding.field.to_string(), from_sql_value(value));
        }
        Ok(coercion::from_storage(schema.entity, record))
    }

    async fn query_records(
        &self,
        schema: &RegisteredSchema,
        sql: &str,
        params: Vec<libsql::Value>,
    ) -> Result<Vec<Record>, DatabaseError> {
        let mut rows = self
            .conn
            .query(sql, Params::Positional(params))
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!("Failed to query {}: {}", schema.table, e))
            })?;

        let mut records = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::row_decoding(&schema.table, e.to_string()))?
        {
            records.push(Self::decode_row(schema, &row)?);
        }
        Ok(records)
    }
}

fn to_sql_value(
    schema: &RegisteredSchema,
    field: &FieldDescriptor,
    value: Value,
) -> Result<libsql::Value, DatabaseError> {
    match value {
        Value::Null => Ok(libsql::Value::Null),
        Value::Bool(b) => Ok(libsql::Value::Integer(i64::from(b))),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Ok(libsql::Value::Integer(i)),
            (None, Some(f)) => Ok(libsql::Value::Real(f)),
            _ => Err(DatabaseError::invalid_value(
                schema.entity.name,
                field.name,
                "number out of range",
            )),
        },
        Value::String(s) => Ok(libsql::Value::Text(s)),
        Value::Array(_) | Value::Object(_) => Err(DatabaseError::invalid_value(
            schema.entity.name,
            field.name,
            "nested values are not storable",
        )),
    }
}

fn from_sql_value(value: libsql::Value) -> Value {
    match value {
        libsql::Value::Null => Value::Null,
        libsql::Value::Integer(i) => Value::from(i),
        libsql::Value::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        libsql::Value::Text(s) => Value::String(s),
        libsql::Value::Blob(bytes) => Value::from(bytes),
    }
}

#[async_trait]
impl RecordStore for LibsqlStore {
    fn backend_name(&self) -> &'static str {
        LIBSQL_BACKEND
    }

    async fn is_connected(&self) -> bool {
        match self.conn.query("SELECT 1", ()).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(target = %self.target, error = %e, "libsql liveness check failed");
                false
            }
        }
    }

    async fn define_structure(
        &self,
        entity: &'static EntityDefinition,
    ) -> Result<Arc<RegisteredSchema>, DatabaseError> {
        let schema = RegisteredSchema::snake_case(entity);
        let ddl = Self::create_table_sql(&schema);

        self.conn.execute(&ddl, ()).await.map_err(|e| {
            DatabaseError::sql_execution(format!(
                "Failed to create table '{}': {}",
                schema.table, e
            ))
        })?;

        tracing::debug!(entity = entity.name, table = %schema.table, "libsql table ready");
        Ok(Arc::new(schema))
    }

    async fn create(
        &self,
        schema: &RegisteredSchema,
        record: Record,
    ) -> Result<Record, DatabaseError> {
        let now = coercion::now_timestamp();
        let values = coercion::prepare_insert(schema.entity, record, &now)?;

        let mut columns = Vec::with_capacity(values.len());
        let mut params = Vec::with_capacity(values.len());
        for (field, value) in values {
            columns.push(Self::column_of(schema, field)?);
            params.push(to_sql_value(schema, field, value)?);
        }

        let sql = if columns.is_empty() {
            format!(
                "INSERT INTO {} DEFAULT VALUES RETURNING {}",
                Self::quote(&schema.table),
                Self::column_list(schema)
            )
        } else {
            format!(
                "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
                Self::quote(&schema.table),
                columns.join(", "),
                vec!["?"; columns.len()].join(", "),
                Self::column_list(schema)
            )
        };

        let mut created = self.query_records(schema, &sql, params).await?;
        tracing::debug!(table = %schema.table, "inserted row");
        created.pop().ok_or_else(|| {
            DatabaseError::sql_execution(format!(
                "Insert into '{}' returned no row",
                schema.table
            ))
        })
    }

    async fn read(
        &self,
        schema: &RegisteredSchema,
        query: Option<&Record>,
    ) -> Result<Vec<Record>, DatabaseError> {
        let prepared = match query {
            Some(q) => coercion::prepare_query(schema.entity, q)?,
            None => Vec::new(),
        };
        let (predicate, params) = Self::where_clause(schema, prepared)?;

        let sql = format!(
            "SELECT {} FROM {}{} ORDER BY rowid",
            Self::column_list(schema),
            Self::quote(&schema.table),
            predicate
        );

        let records = self.query_records(schema, &sql, params).await?;
        tracing::debug!(table = %schema.table, rows = records.len(), "read rows");
        Ok(records)
    }

    async fn update(
        &self,
        schema: &RegisteredSchema,
        id: i64,
        record: Record,
    ) -> Result<u64, DatabaseError> {
        let now = coercion::now_timestamp();
        let values = coercion::prepare_update(schema.entity, record, &now)?;

        let mut assignments = Vec::with_capacity(values.len());
        let mut params = Vec::with_capacity(values.len() + 1);
        for (field, value) in values {
            assignments.push(format!("{} = ?", Self::column_of(schema, field)?));
            params.push(to_sql_value(schema, field, value)?);
        }
        params.push(libsql::Value::Integer(id));

        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?",
            Self::quote(&schema.table),
            assignments.join(", "),
            Self::key_column(schema)
        );

        let affected = self
            .conn
            .execute(&sql, Params::Positional(params))
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!(
                    "Failed to update '{}' row {}: {}",
                    schema.table, id, e
                ))
            })?;

        tracing::debug!(table = %schema.table, id, affected, "updated rows");
        Ok(affected)
    }

    async fn delete(
        &self,
        schema: &RegisteredSchema,
        id: Option<i64>,
    ) -> Result<u64, DatabaseError> {
        let table = Self::quote(&schema.table);
        let result = match id {
            Some(id) => {
                let sql = format!("DELETE FROM {} WHERE {} = ?", table, Self::key_column(schema));
                self.conn
                    .execute(&sql, Params::Positional(vec![libsql::Value::Integer(id)]))
                    .await
            }
            None => self.conn.execute(&format!("DELETE FROM {}", table), ()).await,
        };

        let removed = result.map_err(|e| {
            DatabaseError::sql_execution(format!(
                "Failed to delete from '{}': {}",
                schema.table, e
            ))
        })?;

        tracing::debug!(table = %schema.table, ?id, removed, "deleted rows");
        Ok(removed)
    }

    async fn truncate(&self, schema: &RegisteredSchema) -> Result<u64, DatabaseError> {
        let removed = self.delete(schema, None).await?;

        if schema.entity.fields.iter().any(|f| f.auto_increment) {
            self.conn
                .execute(
                    "DELETE FROM sqlite_sequence WHERE name = ?",
                    Params::Positional(vec![libsql::Value::Text(schema.table.clone())]),
                )
                .await
                .map_err(|e| {
                    DatabaseError::sql_execution(format!(
                        "Failed to reset sequence of '{}': {}",
                        schema.table, e
                    ))
                })?;
        }

        Ok(removed)
    }

    async fn destroy(&self, schema: &RegisteredSchema) -> Result<(), DatabaseError> {
        let sql = format!("DROP TABLE IF EXISTS {}", Self::quote(&schema.table));
        self.conn.execute(&sql, ()).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to drop '{}': {}", schema.table, e))
        })?;

        tracing::info!(table = %schema.table, "table dropped");
        Ok(())
    }
}
