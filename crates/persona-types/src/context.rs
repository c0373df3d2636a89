//! Structured context payloads attached to change records.
//!
//! A context is a set of named fields. Most fields are plain JSON values,
//! but a field may also hold an associative map whose keys are arbitrary
//! JSON values (numbers, arrays, objects) and whose insertion order is
//! significant. A JSON object can carry neither, so map fields are written
//! as an array of `[key, value]` pairs plus an explicit marker:
//!
//! ```text
//! { "source": "duel", "witnesses": [[1, "Ada"], [2, "Brom"]], "_witnessesSerialized": true }
//! ```
//!
//! A field without its `_<field>Serialized` marker is always read back as a
//! plain value, even when it happens to look like a list of pairs.
//!
//! Because markers share the field namespace, a context may not hold both a
//! field `f` and a field `_fSerialized` when `f` is a map or when
//! `_fSerialized` is the plain value `true`. Either pairing would encode to
//! JSON that reads back differently, so the builders reject it with
//! [`ContextError::ReservedName`].

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Errors raised while building a context or reading one back from JSON.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    /// A field name collides with the map marker of another field.
    #[error("context field `{marker}` collides with the map marker of field `{field}`")]
    ReservedName {
        /// The `_<field>Serialized` name.
        marker: String,
        /// The field the marker belongs to.
        field: String,
    },

    /// A field marked as a serialized map is not an array of pairs.
    #[error("context field `{field}` is marked as a map but {reason}")]
    MalformedMap {
        /// The offending field name.
        field: String,
        /// What was wrong with the encoded pairs.
        reason: &'static str,
    },
}

// ---------------------------------------------------------------------------
// AssocMap
// ---------------------------------------------------------------------------

/// An insertion-ordered associative map with JSON keys.
///
/// Keys are unique; inserting an existing key replaces its value in place
/// and keeps the original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssocMap {
    entries: Vec<(Value, Value)>,
}

impl AssocMap {
    /// Create an empty map.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert a key/value pair, returning the previous value for the key.
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(&mut slot.1, value));
        }
        self.entries.push((key, value));
        None
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<Value>, value: impl Into<Value>) -> Self {
        self.insert(key.into(), value.into());
        self
    }

    /// Look up the value stored under `key`.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Number of entries.
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Encode as `[[key, value], ...]`.
    fn to_pairs(&self) -> Value {
        Value::Array(
            self.entries
                .iter()
                .map(|(k, v)| Value::Array(vec![k.clone(), v.clone()]))
                .collect(),
        )
    }

    /// Decode from `[[key, value], ...]`.
    fn from_pairs(field: &str, encoded: &Value) -> Result<Self, ContextError> {
        let malformed = |reason| ContextError::MalformedMap {
            field: field.to_owned(),
            reason,
        };

        let items = encoded.as_array().ok_or_else(|| malformed("is not an array"))?;
        let mut map = Self::new();
        for item in items {
            match item.as_array().map(Vec::as_slice) {
                Some([key, value]) => {
                    if map.insert(key.clone(), value.clone()).is_some() {
                        return Err(malformed("contains a duplicate key"));
                    }
                }
                _ => return Err(malformed("contains an entry that is not a [key, value] pair")),
            }
        }
        Ok(map)
    }
}

impl FromIterator<(Value, Value)> for AssocMap {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

// ---------------------------------------------------------------------------
// ChangeContext
// ---------------------------------------------------------------------------

/// One named field of a [`ChangeContext`].
#[derive(Debug, Clone, PartialEq)]
pub enum ContextField {
    /// A plain JSON value, stored as-is.
    Value(Value),
    /// An associative map, stored as tagged pairs.
    Map(AssocMap),
}

/// Optional structured payload explaining a change.
///
/// The ledger never interprets a context; it only guarantees that the
/// payload survives a JSON round trip unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeContext {
    fields: BTreeMap<String, ContextField>,
}

impl ChangeContext {
    /// Create an empty context.
    pub const fn new() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }

    /// Add a plain value field, replacing any field of the same name.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::ReservedName`] if the field and an existing
    /// one would be confused for a map and its marker.
    pub fn with_value(
        self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Self, ContextError> {
        self.with_field(name.into(), ContextField::Value(value.into()))
    }

    /// Add an associative map field, replacing any field of the same name.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::ReservedName`] if a field named
    /// `_<name>Serialized` is already present.
    pub fn with_map(self, name: impl Into<String>, map: AssocMap) -> Result<Self, ContextError> {
        self.with_field(name.into(), ContextField::Map(map))
    }

    fn with_field(mut self, name: String, field: ContextField) -> Result<Self, ContextError> {
        // `name` as the marker of another field.
        if let Some(base) = marked_field(&name)
            && let Some(existing) = self.fields.get(base)
            && (is_true(&field) || matches!(existing, ContextField::Map(_)))
        {
            return Err(ContextError::ReservedName {
                field: base.to_owned(),
                marker: name,
            });
        }

        // `name` as the field of an existing marker.
        let marker = marker_name(&name);
        if let Some(existing) = self.fields.get(&marker)
            && (is_true(existing) || matches!(field, ContextField::Map(_)))
        {
            return Err(ContextError::ReservedName {
                marker,
                field: name,
            });
        }

        self.fields.insert(name, field);
        Ok(self)
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&ContextField> {
        self.fields.get(name)
    }

    /// Look up a plain value field.
    pub fn value(&self, name: &str) -> Option<&Value> {
        match self.fields.get(name) {
            Some(ContextField::Value(v)) => Some(v),
            _ => None,
        }
    }

    /// Look up a map field.
    pub fn map(&self, name: &str) -> Option<&AssocMap> {
        match self.fields.get(name) {
            Some(ContextField::Map(m)) => Some(m),
            _ => None,
        }
    }

    /// Iterate over fields ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContextField)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the context has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Encode into a JSON object, expanding map fields into pairs + marker.
    pub fn to_json(&self) -> Map<String, Value> {
        let mut object = Map::new();
        for (name, field) in &self.fields {
            match field {
                ContextField::Value(v) => {
                    object.insert(name.clone(), v.clone());
                }
                ContextField::Map(m) => {
                    object.insert(name.clone(), m.to_pairs());
                    object.insert(marker_name(name), Value::Bool(true));
                }
            }
        }
        object
    }

    /// Decode from a JSON object, restoring every marked map field.
    pub fn from_json(mut object: Map<String, Value>) -> Result<Self, ContextError> {
        let marked: Vec<String> = object
            .iter()
            .filter(|(_, v)| matches!(v, Value::Bool(true)))
            .filter_map(|(k, _)| marked_field(k))
            .filter(|field| object.contains_key(*field))
            .map(str::to_owned)
            .collect();

        let mut fields = BTreeMap::new();
        for field in marked {
            object.remove(&marker_name(&field));
            if let Some(encoded) = object.remove(&field) {
                let map = AssocMap::from_pairs(&field, &encoded)?;
                fields.insert(field, ContextField::Map(map));
            }
        }
        for (name, value) in object {
            fields.insert(name, ContextField::Value(value));
        }

        Ok(Self { fields })
    }
}

impl Serialize for ChangeContext {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let extra = self
            .fields
            .values()
            .filter(|f| matches!(f, ContextField::Map(_)))
            .count();
        let mut out = serializer.serialize_map(Some(self.fields.len().saturating_add(extra)))?;
        for (name, field) in &self.fields {
            match field {
                ContextField::Value(v) => out.serialize_entry(name, v)?,
                ContextField::Map(m) => {
                    out.serialize_entry(name, &m.to_pairs())?;
                    out.serialize_entry(&marker_name(name), &true)?;
                }
            }
        }
        out.end()
    }
}

impl<'de> Deserialize<'de> for ChangeContext {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let object = Map::<String, Value>::deserialize(deserializer)?;
        Self::from_json(object).map_err(D::Error::custom)
    }
}

fn is_true(field: &ContextField) -> bool {
    matches!(field, ContextField::Value(Value::Bool(true)))
}

/// `witnesses` -> `_witnessesSerialized`.
fn marker_name(field: &str) -> String {
    format!("_{field}Serialized")
}

/// `_witnessesSerialized` -> `witnesses`.
fn marked_field(key: &str) -> Option<&str> {
    key.strip_prefix('_')
        .and_then(|rest| rest.strip_suffix("Serialized"))
        .filter(|field| !field.is_empty())
}
