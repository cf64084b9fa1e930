//! Request payload validation
//!
//! Payloads are checked against the entity definitions before any
//! controller runs, so malformed requests answer 400 without touching
//! storage.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use taskboard_core::models::{EntityDefinition, FieldType, Record};

use crate::http_error::HttpError;

/// Maximum secret length accepted at login and registration
pub const MAX_SECRET_LEN: usize = 32;

/// Check a create payload: required fields present, lengths within bounds
pub fn validate_create(
    entity: &'static EntityDefinition,
    payload: &Record,
) -> Result<(), HttpError> {
    for field in entity.fields.iter().filter(|f| f.is_required()) {
        match payload.get(field.name) {
            None | Some(Value::Null) => {
                return Err(HttpError::validation(format!(
                    "\"{}\" is required",
                    field.name
                )))
            }
            Some(_) => {}
        }
    }

    validate_fields(entity, payload)
}

/// Check a sparse update payload: at least one field, lengths within bounds
pub fn validate_update(
    entity: &'static EntityDefinition,
    payload: &Record,
) -> Result<(), HttpError> {
    if payload.is_empty() {
        return Err(HttpError::validation("Request body must not be empty"));
    }

    validate_fields(entity, payload)
}

fn validate_fields(entity: &'static EntityDefinition, payload: &Record) -> Result<(), HttpError> {
    for (name, value) in payload {
        let field = entity
            .field(name)
            .ok_or_else(|| HttpError::validation(format!("\"{}\" is not allowed", name)))?;

        let ok = match (field.field_type, value) {
            (_, Value::Null) => field.nullable,
            (FieldType::Integer, v) => v.is_i64(),
            (FieldType::Boolean, Value::Bool(_)) => true,
            (FieldType::Boolean, v) => matches!(v.as_i64(), Some(0 | 1)),
            (FieldType::Text { max_len }, Value::String(s)) => {
                max_len.map_or(true, |max| s.chars().count() <= max as usize)
            }
            (FieldType::Timestamp, v) => v.is_string(),
            _ => false,
        };

        if !ok {
            return Err(HttpError::validation(match field.max_len() {
                Some(max) => format!("\"{}\" must be a valid value of at most {} characters", name, max),
                None => format!("\"{}\" has an invalid value", name),
            }));
        }
    }

    Ok(())
}

// Regex pattern for e-mail addresses: dot-separated local atoms, then
// dot-separated domain labels ending in an alphabetic TLD
const EMAIL_PATTERN: &str = r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,}$";

/// E-mail shape check: `local@domain.tld`
pub fn validate_email(email: &str) -> Result<(), HttpError> {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let email_regex = EMAIL_REGEX.get_or_init(|| Regex::new(EMAIL_PATTERN).unwrap());

    if email_regex.is_match(email) {
        Ok(())
    } else {
        Err(HttpError::validation("\"email\" must be a valid email"))
    }
}

/// Secret must be present and short enough for bcrypt's input limit
pub fn validate_secret(secret: &str) -> Result<(), HttpError> {
    if secret.is_empty() {
        return Err(HttpError::validation("\"secret\" is required"));
    }
    if secret.chars().count() > MAX_SECRET_LEN {
        return Err(HttpError::validation(format!(
            "\"secret\" must be at most {} characters",
            MAX_SECRET_LEN
        )));
    }
    Ok(())
}
