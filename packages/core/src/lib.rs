//! Taskboard Core Business Logic Layer
//!
//! This crate provides the data management and controller layer for the
//! Taskboard REST backend: accounts, tasks and task items over a pluggable
//! storage backend.
//!
//! # Architecture
//!
//! - **Static Entity Definitions**: field layouts declared once as `static`
//! - **Pluggable Storage**: `RecordStore` trait with libsql and in-memory backends
//! - **Soft Delete**: records are excluded by flag, hard delete is explicit
//! - **Logical Booleans**: callers see `true`/`false`, storage keeps `0`/`1`
//!
//! # Modules
//!
//! - [`models`] - Entity definitions and record helpers
//! - [`db`] - Storage adapters and the `DataContext` facade
//! - [`services`] - Controllers and credentials
//! - [`config`] - Environment-driven configuration

pub mod config;
pub mod db;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use config::{AppConfig, ConfigError, CredentialConfig, DatabaseConfig, DatabaseLocation};
pub use db::{DataContext, DatabaseError, RecordStore};
pub use models::*;
pub use services::*;
