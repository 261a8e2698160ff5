//! Diff computation.

use serde_json::Value;

use super::change::{ElementChange, FieldChange, StateDiff};
use crate::core::constants::{DIFF_LIST_LIMIT, EMPTY_STRING_LITERAL};
use crate::core::{BuildMode, Snapshot};

/// Diff engine bound to a build mode.
///
/// In production mode every diff is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateDiffer {
    mode: BuildMode,
}

impl Default for StateDiffer {
    fn default() -> Self {
        Self::new(BuildMode::detect())
    }
}

impl StateDiffer {
    /// Create a differ for the given mode.
    pub fn new(mode: BuildMode) -> Self {
        Self { mode }
    }

    /// The configured mode.
    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    /// Diff two snapshots, or return an empty diff when inactive.
    pub fn diff(&self, old: &Snapshot, new: &Snapshot) -> StateDiff {
        if self.mode.is_development() {
            build_diff(old, new)
        } else {
            StateDiff::new()
        }
    }
}

/// Describe every field that differs between `old` and `new`.
///
/// Fields with equal values are left out. Removed fields are reported as
/// deleted; fields only present in `new` are reported with their rendered
/// value after all fields of `old`.
pub fn build_diff(old: &Snapshot, new: &Snapshot) -> StateDiff {
    let mut diff = StateDiff::new();

    for (field, old_value) in old {
        match new.get(field) {
            None => diff.record(field.as_str(), FieldChange::Deleted),
            Some(new_value) if new_value != old_value => {
                diff.record(field.as_str(), compare_field(old_value, new_value));
            }
            Some(_) => {}
        }
    }

    for (field, new_value) in new {
        if !old.contains_key(field) {
            diff.record(field.as_str(), FieldChange::Added(render(new_value)));
        }
    }

    diff
}

fn compare_field(old: &Value, new: &Value) -> FieldChange {
    let resolved = if new.is_null() { old } else { new };

    if is_primitive(resolved) {
        return FieldChange::Transition(format!("{} => {}", render(old), render(new)));
    }

    sequence_change(old, new).unwrap_or_else(|| FieldChange::Replaced(new.clone()))
}

/// Sequence rules. `None` when either side is neither a sequence nor null.
fn sequence_change(old: &Value, new: &Value) -> Option<FieldChange> {
    let change = match (old, new) {
        (Value::Array(old), Value::Null) => {
            FieldChange::CountChanged(format!("contained {} elements, now is null", old.len()))
        }
        (Value::Null, Value::Array(new)) => {
            FieldChange::CountChanged(format!("was null, now contains {} elements", new.len()))
        }
        (Value::Array(old), Value::Array(new)) if old.is_empty() => {
            FieldChange::CountChanged(format!("was empty, now contains {} elements", new.len()))
        }
        (Value::Array(old), Value::Array(new)) if new.is_empty() => {
            FieldChange::CountChanged(format!("contained {} elements, now is empty", old.len()))
        }
        (Value::Array(old), Value::Array(new)) => FieldChange::Sequence {
            added: element_change(missing_from(new, old), "added"),
            removed: element_change(missing_from(old, new), "removed"),
        },
        _ => return None,
    };
    Some(change)
}

/// Elements of `from` with no deep-equal element in `other`.
fn missing_from(from: &[Value], other: &[Value]) -> Vec<Value> {
    from.iter()
        .filter(|element| !other.contains(element))
        .cloned()
        .collect()
}

fn element_change(elements: Vec<Value>, verb: &str) -> ElementChange {
    if elements.len() > DIFF_LIST_LIMIT {
        ElementChange::Summary(format!("{} elements {verb}", elements.len()))
    } else {
        ElementChange::Elements(elements)
    }
}

fn is_primitive(value: &Value) -> bool {
    matches!(value, Value::Bool(_) | Value::Number(_) | Value::String(_))
}

/// Plain-text rendering: strings unquoted (an empty string as `""`),
/// everything else as JSON.
fn render(value: &Value) -> String {
    match value {
        Value::String(text) if text.is_empty() => EMPTY_STRING_LITERAL.to_string(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
