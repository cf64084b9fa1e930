//! Entity Definition Types
//!
//! An `EntityDefinition` is the static field layout of one resource. Storage
//! adapters read it to materialize tables, fill defaults and coerce values;
//! controllers hold a `&'static` reference to it for their whole lifetime.
//!
//! Field names are the canonical camelCase names callers use in records.
//! How a backend names its columns is decided by the adapter, never here.
//!
//! # Example
//!
//! ```rust
//! use taskboard_core::models::{DefaultValue, EntityDefinition, FieldDescriptor, FieldType};
//!
//! static NOTE_FIELDS: &[FieldDescriptor] = &[
//!     FieldDescriptor::primary_key("id"),
//!     FieldDescriptor::new("body", FieldType::Text { max_len: Some(200) }),
//!     FieldDescriptor::new("pinned", FieldType::Boolean).with_default(DefaultValue::Bool(false)),
//! ];
//!
//! static NOTE: EntityDefinition = EntityDefinition::new("note", "notes", NOTE_FIELDS);
//!
//! assert!(NOTE.field("pinned").unwrap().is_boolean());
//! ```

use serde::Serialize;

/// Canonical name of the primary key field
pub const ID_FIELD: &str = "id";

/// Canonical name of the creation timestamp field
pub const CREATION_TIMESTAMP_FIELD: &str = "creationTimestamp";

/// Canonical name of the update timestamp field
///
/// Adapters refresh this field on every update when the entity declares it.
pub const UPDATE_TIMESTAMP_FIELD: &str = "updateTimestamp";

/// Canonical name of the soft-delete flag
pub const EXCLUDED_FIELD: &str = "excluded";

/// Canonical name of the active flag
pub const ACTIVE_FIELD: &str = "active";

/// Logical type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum FieldType {
    /// 64-bit signed integer
    Integer,
    /// UTF-8 text with an optional maximum length in characters
    Text { max_len: Option<u32> },
    /// Logical boolean, stored by adapters as a single-bit integer
    Boolean,
    /// UTC instant, exchanged as an RFC 3339 string
    Timestamp,
}

/// Default applied when a record is created without the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "value")]
pub enum DefaultValue {
    Bool(bool),
    Integer(i64),
    Text(&'static str),
    /// Current time at the moment of insertion
    Now,
}

/// Descriptor for a single field of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub field_type: FieldType,
    pub nullable: bool,
    pub primary_key: bool,
    pub auto_increment: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,
}

impl FieldDescriptor {
    /// Create a non-nullable field with no default
    pub const fn new(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            nullable: false,
            primary_key: false,
            auto_increment: false,
            default: None,
        }
    }

    /// Create an auto-incrementing integer primary key
    pub const fn primary_key(name: &'static str) -> Self {
        Self {
            name,
            field_type: FieldType::Integer,
            nullable: false,
            primary_key: true,
            auto_increment: true,
            default: None,
        }
    }

    /// Create a timestamp field defaulting to the insertion time
    pub const fn timestamp(name: &'static str) -> Self {
        Self::new(name, FieldType::Timestamp).with_default(DefaultValue::Now)
    }

    /// Create a boolean flag with the given default
    pub const fn flag(name: &'static str, default: bool) -> Self {
        Self::new(name, FieldType::Boolean).with_default(DefaultValue::Bool(default))
    }

    pub const fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub const fn is_boolean(&self) -> bool {
        matches!(self.field_type, FieldType::Boolean)
    }

    /// Whether a create without this field must be rejected
    pub const fn is_required(&self) -> bool {
        !self.nullable && !self.auto_increment && self.default.is_none()
    }

    /// Maximum text length, if the field is bounded text
    pub const fn max_len(&self) -> Option<u32> {
        match self.field_type {
            FieldType::Text { max_len } => max_len,
            _ => None,
        }
    }
}

/// Static field layout of one resource
///
/// Immutable once declared. `name` identifies the entity in logs and
/// errors, `table` is the preferred storage structure name.
#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDefinition {
    pub name: &'static str,
    pub table: &'static str,
    pub fields: &'static [FieldDescriptor],
}

impl EntityDefinition {
    pub const fn new(
        name: &'static str,
        table: &'static str,
        fields: &'static [FieldDescriptor],
    ) -> Self {
        Self {
            name,
            table,
            fields,
        }
    }

    /// Look up a field by canonical name
    pub fn field(&self, name: &str) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The primary key field, if the entity declares one
    pub fn primary_key(&self) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|f| f.primary_key)
    }

    /// Iterate over the boolean fields
    pub fn boolean_fields(&self) -> impl Iterator<Item = &'static FieldDescriptor> {
        self.fields.iter().filter(|f| f.is_boolean())
    }
}
