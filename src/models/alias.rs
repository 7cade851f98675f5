//! Field-alias resolution for loosely-typed records
//!
//! Base datasets and older overlays spell the same field several ways
//! (`bankName`, `bank_name`, `bank`). Each record type declares a table of
//! accepted keys per canonical field; resolution happens once, at the
//! repository boundary, and produces the canonical typed record.

use serde_json::{Map, Value};

/// One canonical field and the raw keys that may carry it, in priority order
pub type FieldAliases = (&'static str, &'static [&'static str]);

/// Return the first non-empty string value found under any of `keys`
///
/// Numbers are accepted and rendered as text, since account numbers and
/// phone numbers are frequently authored as JSON numbers.
pub fn first_text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match obj.get(*key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Resolve a canonical field through an alias table
pub fn resolve(obj: &Map<String, Value>, table: &[FieldAliases], canonical: &str) -> Option<String> {
    table
        .iter()
        .find(|(name, _)| *name == canonical)
        .and_then(|(_, keys)| first_text(obj, keys))
}
