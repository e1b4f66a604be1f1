//! Lenient field access over raw tracking records.
//!
//! Tracking queries return sparse records: a field may be missing, `null`,
//! or present but empty. Every accessor here collapses those cases onto a
//! declared default using truthiness rules, so `0`, `""`, `[]` and `{}` all
//! read as "unset". The one exception is [`required_id`].

use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::types::{Date, DbId, RawRecord, Timestamp};

// ---------------------------------------------------------------------------
// Truthiness
// ---------------------------------------------------------------------------

/// Whether a JSON value counts as "set".
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// The value under `key`, if it is truthy.
pub fn truthy<'a>(raw: &'a RawRecord, key: &str) -> Option<&'a Value> {
    raw.get(key).filter(|v| is_truthy(v))
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Display name of a record: `code`, falling back to `name`.
pub fn entity_name(raw: &RawRecord) -> String {
    opt_str(raw, "code")
        .or_else(|| opt_str(raw, "name"))
        .unwrap_or_default()
}

/// The mandatory `id` field.
pub fn required_id(raw: &RawRecord, entity: &'static str) -> CoreResult<DbId> {
    let value = raw.get("id").filter(|v| !v.is_null()).ok_or(CoreError::MissingField {
        entity,
        field: "id",
    })?;
    value_as_int(value).ok_or_else(|| CoreError::InvalidField {
        entity,
        field: "id",
        reason: format!("expected an integer, got {value}"),
    })
}

// ---------------------------------------------------------------------------
// Scalars
// ---------------------------------------------------------------------------

/// A non-empty string field.
pub fn opt_str(raw: &RawRecord, key: &str) -> Option<String> {
    truthy(raw, key)
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// A string field, or `""` when unset.
pub fn str_or_empty(raw: &RawRecord, key: &str) -> String {
    opt_str(raw, key).unwrap_or_default()
}

/// Integer view of a JSON value. Floats truncate; numeric strings parse.
pub fn value_as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// A non-zero integer field.
pub fn opt_int(raw: &RawRecord, key: &str) -> Option<i64> {
    truthy(raw, key).and_then(value_as_int).filter(|n| *n != 0)
}

/// An integer field, or `default` when unset or zero.
pub fn int_or(raw: &RawRecord, key: &str, default: i64) -> i64 {
    opt_int(raw, key).unwrap_or(default)
}

/// A non-zero float field.
pub fn opt_float(raw: &RawRecord, key: &str) -> Option<f64> {
    truthy(raw, key).and_then(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// A boolean field; anything other than a JSON bool reads by truthiness.
pub fn flag(raw: &RawRecord, key: &str) -> bool {
    raw.get(key).is_some_and(is_truthy)
}

/// A `YYYY-MM-DD` date field.
pub fn opt_date(raw: &RawRecord, key: &str) -> Option<Date> {
    let text = truthy(raw, key)?.as_str()?;
    match Date::parse_from_str(text, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(e) => {
            tracing::debug!(key, value = text, error = %e, "Ignoring unparseable date");
            None
        }
    }
}

/// An RFC 3339 timestamp field.
pub fn opt_timestamp(raw: &RawRecord, key: &str) -> Option<Timestamp> {
    let text = truthy(raw, key)?.as_str()?;
    match chrono::DateTime::parse_from_rfc3339(text) {
        Ok(ts) => Some(ts.with_timezone(&chrono::Utc)),
        Err(e) => {
            tracing::debug!(key, value = text, error = %e, "Ignoring unparseable timestamp");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Nested records
// ---------------------------------------------------------------------------

/// A non-empty nested record.
pub fn record<'a>(raw: &'a RawRecord, key: &str) -> Option<&'a RawRecord> {
    truthy(raw, key).and_then(Value::as_object)
}

/// A list of nested records. Non-object entries are skipped with a warning.
pub fn records<'a>(raw: &'a RawRecord, key: &str) -> Vec<&'a RawRecord> {
    let Some(items) = truthy(raw, key).and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let record = item.as_object();
            if record.is_none() {
                tracing::warn!(key, value = %item, "Skipping non-record entry in list field");
            }
            record
        })
        .collect()
}

/// `raw[key]["name"]`, or `""` when either level is unset.
pub fn nested_name(raw: &RawRecord, key: &str) -> String {
    record(raw, key)
        .map(|inner| str_or_empty(inner, "name"))
        .unwrap_or_default()
}

/// Tag names. Tags arrive either as plain strings or as `{type, id, name}`
/// summaries.
pub fn tags(raw: &RawRecord) -> Vec<String> {
    let Some(items) = truthy(raw, "tags").and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Object(map) => opt_str(map, "name"),
            _ => None,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
