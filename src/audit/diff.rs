//! Field-level change detection for the history trail
//!
//! `diff` compares an old record snapshot against an ordered set of field
//! updates and produces one `HistoryEntry` per field whose string form
//! changed. Values are compared after stringification, so a number and a
//! string that print the same (`0` and `"0"`) count as unchanged.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{TrackerError, TrackerResult};
use crate::models::{HistoryId, UserId};

use super::entry::{EntityType, HistoryEntry};

/// A record snapshot keyed by serialized field name
pub type Snapshot = Map<String, Value>;

/// Ordered field updates
///
/// Keeps insertion order; setting a key twice replaces the value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldUpdates {
    fields: Vec<(String, Value)>,
}

impl FieldUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, keeping its original position if already present
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for FieldUpdates {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut updates = Self::new();
        for (key, value) in iter {
            updates.set(key, value);
        }
        updates
    }
}

/// Serialize a typed record into a snapshot
pub fn snapshot<T: Serialize>(record: &T) -> TrackerResult<Snapshot> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        other => Err(TrackerError::Json(format!(
            "Expected a record object, got {}",
            other
        ))),
    }
}

/// String form used for both comparison and storage
///
/// Absent and null become the empty string; strings are taken as-is;
/// numbers and booleans use their textual form; arrays and objects are
/// compact JSON.
pub fn stringify(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other @ (Value::Array(_) | Value::Object(_))) => other.to_string(),
    }
}

/// Compute the history entries for applying `updates` to `old_record`
///
/// Entries follow the order of `updates`. Fields whose string forms are
/// equal are skipped. Fails with `MissingAttribution` only when at least one
/// entry would be produced and either `actor` or `record_id` is absent.
pub fn diff(
    entity_type: EntityType,
    old_record: &Snapshot,
    updates: &FieldUpdates,
    actor: Option<UserId>,
    record_id: Option<&str>,
    timestamp: DateTime<Utc>,
) -> TrackerResult<Vec<HistoryEntry>> {
    let changed: Vec<(&str, String, String)> = updates
        .iter()
        .filter_map(|(field, new)| {
            let old_value = stringify(old_record.get(field));
            let new_value = stringify(Some(new));
            (old_value != new_value).then_some((field, old_value, new_value))
        })
        .collect();

    if changed.is_empty() {
        return Ok(Vec::new());
    }

    let user_id = actor.ok_or(TrackerError::MissingAttribution { missing: "actor" })?;
    let record_id = record_id
        .filter(|id| !id.trim().is_empty())
        .ok_or(TrackerError::MissingAttribution { missing: "record id" })?;

    Ok(changed
        .into_iter()
        .map(|(field, old_value, new_value)| HistoryEntry {
            id: HistoryId::new(),
            entity_type,
            record_id: record_id.to_string(),
            user_id,
            field_name: field.to_string(),
            old_value,
            new_value,
            created_at: timestamp,
        })
        .collect())
}

/// Apply entries' new values onto a snapshot, in order
///
/// Values are written back as strings, which is all the history keeps.
pub fn replay(record: &mut Snapshot, entries: &[HistoryEntry]) {
    for entry in entries {
        record.insert(
            entry.field_name.clone(),
            Value::String(entry.new_value.clone()),
        );
    }
}
