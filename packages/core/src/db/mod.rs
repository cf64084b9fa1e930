//! Database Layer
//!
//! This module handles all persistence for Taskboard:
//!
//! - `RecordStore` trait abstracting one storage backend
//! - libsql (embedded file or remote) and in-memory implementations
//! - Value coercion shared by every backend
//! - `DataContext` facade selecting the backend by name
//!
//! # Architecture
//!
//! ```text
//! ResourceController -> DataContext -> dyn RecordStore -> backend
//! ```
//!
//! Callers above this layer only ever see canonical camelCase field names
//! and logical booleans; column naming and 0/1 bits stay inside the adapters.

pub mod coercion;
mod context;
mod error;
mod libsql_store;
mod memory_store;
mod record_store;

pub use context::{BackendKind, DataContext};
pub use error::DatabaseError;
pub use libsql_store::{LibsqlStore, LIBSQL_BACKEND};
pub use memory_store::{MemoryStore, MEMORY_BACKEND};
pub use record_store::{ColumnBinding, RecordStore, RegisteredSchema};
