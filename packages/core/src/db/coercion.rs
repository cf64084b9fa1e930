//! Value coercion between records and storage
//!
//! Every adapter funnels records through this module before touching its
//! backend, and funnels rows back through it before returning them:
//!
//! - unknown field names are rejected
//! - defaults are filled on create, required fields enforced
//! - values are type-checked against the field descriptor
//! - logical booleans become `0`/`1` on the way in and `true`/`false` on
//!   the way out
//! - timestamps are normalized to RFC 3339 UTC with microsecond precision
//! - canonical camelCase field names map to snake_case column names
//!
//! Nothing outside `db` depends on the storage representation.

use chrono::{DateTime, SecondsFormat, Utc};
use convert_case::{Case, Casing};
use serde_json::Value;

use crate::db::DatabaseError;
use crate::models::{
    DefaultValue, EntityDefinition, FieldDescriptor, FieldType, Record, UPDATE_TIMESTAMP_FIELD,
};

/// Field/value pairs ready to be written or matched, in declaration order
pub type StorageValues = Vec<(&'static FieldDescriptor, Value)>;

/// Current instant in the storage timestamp format
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Column name used by SQL backends for a canonical field name
pub fn column_name(field: &str) -> String {
    field.to_case(Case::Snake)
}

/// Prepare a record for insertion
///
/// The auto-increment primary key is always generated by the backend, so a
/// caller-supplied value for it is dropped.
pub fn prepare_insert(
    entity: &'static EntityDefinition,
    mut record: Record,
    now: &str,
) -> Result<StorageValues, DatabaseError> {
    reject_unknown_fields(entity, &record)?;

    let mut values = Vec::with_capacity(entity.fields.len());
    for field in entity.fields {
        if field.auto_increment {
            continue;
        }

        match record.remove(field.name) {
            Some(value) if !value.is_null() || field.nullable => {
                values.push((field, to_storage(entity, field, value)?));
            }
            _ => match field.default {
                Some(default) => values.push((field, default_value(default, now))),
                None if field.nullable => values.push((field, Value::Null)),
                None => {
                    return Err(DatabaseError::MissingField {
                        entity: entity.name,
                        field: field.name,
                    })
                }
            },
        }
    }

    Ok(values)
}

/// Prepare a sparse update
///
/// The primary key is never rewritten and the update timestamp, when the
/// entity declares one, is always set to `now`.
pub fn prepare_update(
    entity: &'static EntityDefinition,
    record: Record,
    now: &str,
) -> Result<StorageValues, DatabaseError> {
    reject_unknown_fields(entity, &record)?;

    let mut values = Vec::with_capacity(record.len() + 1);
    for field in entity.fields {
        if field.primary_key || field.name == UPDATE_TIMESTAMP_FIELD {
            continue;
        }
        if let Some(value) = record.get(field.name) {
            values.push((field, to_storage(entity, field, value.clone())?));
        }
    }

    if let Some(field) = entity.field(UPDATE_TIMESTAMP_FIELD) {
        values.push((field, Value::String(now.to_string())));
    }

    if values.is_empty() {
        return Err(DatabaseError::missing_parameter("record"));
    }

    Ok(values)
}

/// Prepare an equality query; `null` matches absent values
pub fn prepare_query(
    entity: &'static EntityDefinition,
    query: &Record,
) -> Result<StorageValues, DatabaseError> {
    reject_unknown_fields(entity, query)?;

    let mut values = Vec::with_capacity(query.len());
    for field in entity.fields {
        match query.get(field.name) {
            Some(Value::Null) => values.push((field, Value::Null)),
            Some(value) => values.push((field, to_storage(entity, field, value.clone())?)),
            None => {}
        }
    }

    Ok(values)
}

/// Convert a stored row back into a record with logical booleans
pub fn from_storage(entity: &'static EntityDefinition, mut row: Record) -> Record {
    for field in entity.boolean_fields() {
        if let Some(value) = row.get_mut(field.name) {
            if let Some(bit) = value.as_i64() {
                *value = Value::Bool(bit != 0);
            }
        }
    }
    row
}

fn reject_unknown_fields(
    entity: &'static EntityDefinition,
    record: &Record,
) -> Result<(), DatabaseError> {
    match record.keys().find(|name| entity.field(name).is_none()) {
        Some(unknown) => Err(DatabaseError::unknown_field(entity.name, unknown.as_str())),
        None => Ok(()),
    }
}

fn default_value(default: DefaultValue, now: &str) -> Value {
    match default {
        DefaultValue::Bool(b) => Value::from(i64::from(b)),
        DefaultValue::Integer(n) => Value::from(n),
        DefaultValue::Text(s) => Value::from(s),
        DefaultValue::Now => Value::from(now),
    }
}

/// Type-check a value and convert it to its storage representation
fn to_storage(
    entity: &'static EntityDefinition,
    field: &'static FieldDescriptor,
    value: Value,
) -> Result<Value, DatabaseError> {
    let invalid = |reason: &str| DatabaseError::invalid_value(entity.name, field.name, reason);

    if value.is_null() {
        return if field.nullable {
            Ok(Value::Null)
        } else {
            Err(invalid("must not be null"))
        };
    }

    match field.field_type {
        FieldType::Boolean => match (value.as_bool(), value.as_i64()) {
            (Some(b), _) => Ok(Value::from(i64::from(b))),
            (_, Some(bit @ (0 | 1))) => Ok(Value::from(bit)),
            _ => Err(invalid("expected a boolean")),
        },
        FieldType::Integer => match value.as_i64() {
            Some(n) => Ok(Value::from(n)),
            None => Err(invalid("expected an integer")),
        },
        FieldType::Text { max_len } => match value {
            Value::String(s) => match max_len {
                Some(max) if s.chars().count() > max as usize => {
                    Err(invalid(&format!("longer than {} characters", max)))
                }
                _ => Ok(Value::String(s)),
            },
            _ => Err(invalid("expected a string")),
        },
        FieldType::Timestamp => match value.as_str().map(DateTime::parse_from_rfc3339) {
            Some(Ok(at)) => Ok(Value::String(format_timestamp(at.with_timezone(&Utc)))),
            _ => Err(invalid("expected an RFC 3339 timestamp")),
        },
    }
}
