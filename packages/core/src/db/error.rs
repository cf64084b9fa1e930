//! Database Error Types
//!
//! This module defines error types for the data-access layer: backend
//! selection, connection, schema selection, value coercion and query
//! failures. Controller-level failures wrap these in `ControllerError`.

use thiserror::Error;

/// Database operation errors
///
/// Covers every failure of the storage adapters and the data context.
/// Liveness checks never produce one of these; they report `false` instead.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish a connection to the backend
    #[error("Failed to connect to database at {target}: {source}")]
    ConnectionFailed {
        target: String,
        source: libsql::Error,
    },

    /// Requested backend is not in the registry
    #[error("Database not found: unsupported backend '{name}'")]
    UnsupportedBackend { name: String },

    /// A mandatory argument was not supplied
    #[error("Parameter {name} is required")]
    MissingParameter { name: &'static str },

    /// A CRUD call was issued before any schema was selected
    #[error("No schema selected on data context '{context}'")]
    SchemaNotSelected { context: String },

    /// The backend does not implement the requested capability
    #[error("Not implemented: {backend} does not support '{operation}'")]
    NotImplemented {
        backend: &'static str,
        operation: &'static str,
    },

    /// Record or query references a field the entity does not declare
    #[error("Unknown field '{field}' for entity '{entity}'")]
    UnknownField { entity: &'static str, field: String },

    /// Non-nullable field without default is absent on create
    #[error("Field '{field}' is required for entity '{entity}'")]
    MissingField {
        entity: &'static str,
        field: &'static str,
    },

    /// Value does not match the declared field type
    #[error("Invalid value for '{entity}.{field}': {reason}")]
    InvalidValue {
        entity: &'static str,
        field: String,
        reason: String,
    },

    /// Stored row could not be converted back into a record
    #[error("Failed to decode row from '{table}': {reason}")]
    RowDecoding { table: String, reason: String },

    /// SQL execution error with context
    #[error("SQL execution failed: {context}")]
    SqlExecutionError { context: String },
}

impl DatabaseError {
    /// Create a connection failed error
    pub fn connection_failed(target: impl Into<String>, source: libsql::Error) -> Self {
        Self::ConnectionFailed {
            target: target.into(),
            source,
        }
    }

    /// Create an unsupported backend error
    pub fn unsupported_backend(name: impl Into<String>) -> Self {
        Self::UnsupportedBackend { name: name.into() }
    }

    /// Create a missing parameter error
    pub fn missing_parameter(name: &'static str) -> Self {
        Self::MissingParameter { name }
    }

    /// Create a not implemented error
    pub fn not_implemented(backend: &'static str, operation: &'static str) -> Self {
        Self::NotImplemented { backend, operation }
    }

    /// Create an unknown field error
    pub fn unknown_field(entity: &'static str, field: impl Into<String>) -> Self {
        Self::UnknownField {
            entity,
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(
        entity: &'static str,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            entity,
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a row decoding error
    pub fn row_decoding(table: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::RowDecoding {
            table: table.into(),
            reason: reason.into(),
        }
    }

    /// Create a SQL execution error with context
    pub fn sql_execution(context: impl Into<String>) -> Self {
        Self::SqlExecutionError {
            context: context.into(),
        }
    }
}
