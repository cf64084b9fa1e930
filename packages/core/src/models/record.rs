//! Record helpers
//!
//! A record is a JSON object keyed by canonical field name. The same shape
//! is used for stored rows, create payloads, sparse updates and equality
//! queries.

use serde_json::{Map, Value};

use super::entity::ID_FIELD;

/// Mapping from canonical field name to value
pub type Record = Map<String, Value>;

/// Build a record from `(field, value)` pairs
///
/// ```rust
/// use taskboard_core::models::record_from;
/// use serde_json::json;
///
/// let query = record_from([("parentTaskId", json!(7))]);
/// assert_eq!(query["parentTaskId"], 7);
/// ```
pub fn record_from<K, I>(pairs: I) -> Record
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Value)>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

/// Convenience accessors on records
pub trait RecordExt {
    /// The generated identifier, if present and integral
    fn id(&self) -> Option<i64>;

    /// Integer value of a field
    fn get_i64(&self, field: &str) -> Option<i64>;

    /// String value of a field
    fn get_str(&self, field: &str) -> Option<&str>;

    /// Boolean value of a field
    fn get_bool(&self, field: &str) -> Option<bool>;
}

impl RecordExt for Record {
    fn id(&self) -> Option<i64> {
        self.get_i64(ID_FIELD)
    }

    fn get_i64(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(Value::as_i64)
    }

    fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    fn get_bool(&self, field: &str) -> Option<bool> {
        self.get(field).and_then(Value::as_bool)
    }
}
