//! Data Models
//!
//! This module contains the data structures shared by every layer:
//!
//! - `EntityDefinition` / `FieldDescriptor` - static field layouts
//! - `ACCOUNT`, `TASK`, `ITEM` - the three core entity definitions
//! - `Record` - field-name to value mapping used for rows and queries

mod core_entities;
mod entity;
mod record;

pub use core_entities::{
    ACCOUNT, CORE_ENTITIES, EMAIL_FIELD, ITEM, PARENT_ACCOUNT_FIELD, PARENT_TASK_FIELD,
    SECRET_FIELD, TASK,
};
pub use entity::{
    DefaultValue, EntityDefinition, FieldDescriptor, FieldType, ACTIVE_FIELD,
    CREATION_TIMESTAMP_FIELD, EXCLUDED_FIELD, ID_FIELD, UPDATE_TIMESTAMP_FIELD,
};
pub use record::{record_from, Record, RecordExt};
