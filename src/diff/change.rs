//! Diff result types.

use serde::{Serialize, Serializer};
use serde::ser::SerializeMap;
use serde_json::{Map, Value};

use crate::core::constants::DELETED_MARKER;

/// Elements added to or removed from a sequence field.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementChange {
    /// The elements themselves.
    Elements(Vec<Value>),
    /// Count summary, used once the list grows past the display limit.
    Summary(String),
}

impl ElementChange {
    /// JSON rendering.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Elements(elements) => Value::Array(elements.clone()),
            Self::Summary(summary) => Value::String(summary.clone()),
        }
    }
}

/// Description of one changed field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldChange {
    /// Primitive change rendered as `"old => new"`.
    Transition(String),
    /// Sequence toggled between null, empty and non-empty.
    CountChanged(String),
    /// Non-empty sequence whose elements changed.
    Sequence {
        /// Elements in the new value missing from the old one.
        added: ElementChange,
        /// Elements in the old value missing from the new one.
        removed: ElementChange,
    },
    /// Object-valued field; holds the new value.
    Replaced(Value),
    /// Field only present in the new snapshot; holds its rendering.
    Added(String),
    /// Field removed from the new snapshot.
    Deleted,
}

impl FieldChange {
    /// JSON rendering, as printed in diagnostic output.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Transition(text) | Self::CountChanged(text) | Self::Added(text) => {
                Value::String(text.clone())
            }
            Self::Sequence { added, removed } => {
                let mut map = Map::new();
                map.insert("added".into(), added.to_value());
                map.insert("removed".into(), removed.to_value());
                Value::Object(map)
            }
            Self::Replaced(value) => value.clone(),
            Self::Deleted => Value::String(DELETED_MARKER.into()),
        }
    }
}

impl Serialize for FieldChange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Changed fields in scan order: old-snapshot keys first, then new-only keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateDiff {
    entries: Vec<(String, FieldChange)>,
}

impl StateDiff {
    /// Create an empty diff.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, field: impl Into<String>, change: FieldChange) {
        self.entries.push((field.into(), change));
    }

    /// Change recorded for `field`.
    pub fn get(&self, field: &str) -> Option<&FieldChange> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, change)| change)
    }

    /// Number of changed fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing changed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Changed field names, in order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Entries, in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldChange)> {
        self.entries.iter().map(|(name, change)| (name.as_str(), change))
    }

    /// JSON object rendering.
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(name, change)| (name.clone(), change.to_value()))
                .collect(),
        )
    }
}

impl Serialize for StateDiff {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, change) in &self.entries {
            map.serialize_entry(name, change)?;
        }
        map.end()
    }
}
