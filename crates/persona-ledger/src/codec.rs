//! JSON snapshots for ledgers.
//!
//! A snapshot has the shape
//!
//! ```text
//! {
//!   "<domains|tracks|axes>": [ DimensionDefinition, ... ],
//!   "values":  { "<id>": number, ... },
//!   "history": { "<id>": [ ChangeRecord, ... ], ... }
//! }
//! ```
//!
//! Each definition carries its subranges under the kind's own key (`tiers`,
//! `levels`, `zones`) with the subrange metadata flattened into each entry.
//! Change-record contexts use the tagged pair encoding described in
//! [`persona_types::context`].
//!
//! Decoding is all-or-nothing: a malformed snapshot is rejected as a whole.
//!
//! JSON object order is kept, so definitions keyed by id in a legacy
//! manager keep the order they were written in.

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use persona_types::ChangeRecord;

use crate::LedgerError;
use crate::catalog::{DimensionCatalog, DimensionDefinition};
use crate::kinds::DimensionKind;
use crate::ledger::Ledger;

/// Field name used for subranges in the Rust definition type.
const SUBRANGES_FIELD: &str = "subranges";

impl<K: DimensionKind> Ledger<K> {
    /// Encode the snapshot as a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Serialization`] if a definition or record
    /// cannot be encoded.
    pub fn to_json(&self) -> Result<Value, LedgerError> {
        let definitions = self
            .catalog
            .definitions()
            .iter()
            .map(encode_definition::<K>)
            .collect::<Result<Vec<_>, _>>()?;

        let values: Map<String, Value> = self
            .values
            .iter()
            .map(|(id, v)| (id.clone(), Value::from(*v)))
            .collect();

        let mut history = Map::new();
        for (id, records) in &self.history {
            let encoded = serde_json::to_value(&**records).map_err(ser_error::<K>)?;
            history.insert(id.clone(), encoded);
        }

        let mut snapshot = Map::new();
        snapshot.insert(K::COLLECTION_KEY.to_owned(), Value::Array(definitions));
        snapshot.insert("values".to_owned(), Value::Object(values));
        snapshot.insert("history".to_owned(), Value::Object(history));
        Ok(Value::Object(snapshot))
    }

    /// Encode the snapshot as a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Serialization`] on encoding failure.
    pub fn to_json_string(&self) -> Result<String, LedgerError> {
        let value = self.to_json()?;
        serde_json::to_string(&value).map_err(ser_error::<K>)
    }

    /// Decode a snapshot produced by [`to_json`](Self::to_json).
    ///
    /// Missing `values` fall back to defaults and missing `history` to empty
    /// lists.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Deserialization`] for non-object input, a
    /// missing definition list, malformed definitions, values, or records,
    /// and values or history for unknown dimensions.
    /// Returns [`LedgerError::Configuration`] if the definitions decode but
    /// break a catalog rule.
    pub fn from_json(snapshot: &Value) -> Result<Self, LedgerError> {
        let object = snapshot
            .as_object()
            .ok_or_else(|| de_error::<K>("snapshot is not a JSON object"))?;

        let raw_definitions = object.get(K::COLLECTION_KEY).ok_or_else(|| {
            de_error::<K>(format!("missing `{}` definition list", K::COLLECTION_KEY))
        })?;
        let definitions = decode_definitions::<K>(raw_definitions)?;
        let catalog = DimensionCatalog::new(definitions)?;

        let values = decode_values::<K>(object.get("values"))?;
        let history = decode_history::<K>(object.get("history"))?;

        Self::restore(catalog, values, history)
    }

    /// Decode a snapshot from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Deserialization`] if the text is not JSON, plus
    /// everything [`from_json`](Self::from_json) returns.
    pub fn from_json_str(text: &str) -> Result<Self, LedgerError> {
        let value: Value = serde_json::from_str(text).map_err(de_error::<K>)?;
        Self::from_json(&value)
    }

    /// Import the state of a legacy manager object.
    ///
    /// Legacy managers look like
    /// `{ "domains": ..., "playerInfluence": {...}, "history": {...} }`
    /// (with `tracks`/`playerPrestige` or `axes`/`playerAlignment` for the
    /// other kinds). The definitions may be a list or an object keyed by id.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::MissingLegacyManager`] if `manager` is `null`,
    /// otherwise the same errors as [`from_json`](Self::from_json).
    pub fn from_legacy_manager(manager: &Value) -> Result<Self, LedgerError> {
        if manager.is_null() {
            return Err(LedgerError::MissingLegacyManager { noun: K::NOUN });
        }
        let object = manager
            .as_object()
            .ok_or_else(|| de_error::<K>("legacy manager is not a JSON object"))?;

        let raw_definitions = object.get(K::COLLECTION_KEY).ok_or_else(|| {
            de_error::<K>(format!("legacy manager has no `{}`", K::COLLECTION_KEY))
        })?;
        let definitions = match raw_definitions {
            Value::Object(by_id) => decode_keyed_definitions::<K>(by_id)?,
            other => decode_definitions::<K>(other)?,
        };
        let catalog = DimensionCatalog::new(definitions)?;

        let values = decode_values::<K>(object.get(K::LEGACY_VALUES_KEY))?;
        let history = decode_history::<K>(object.get("history"))?;

        tracing::debug!(
            kind = K::NOUN,
            dimensions = catalog.len(),
            "imported legacy manager"
        );
        Self::restore(catalog, values, history)
    }
}

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// A definition deserialized with its subranges under the kind's own key
/// (`tiers`, `levels`, or `zones`), for hand-written catalogs.
#[derive(Debug, Clone, PartialEq)]
pub struct KindDefinition<K: DimensionKind>(pub DimensionDefinition<K::Meta>);

impl<'de, K: DimensionKind> Deserialize<'de> for KindDefinition<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        decode_definition::<K>(&raw)
            .map(Self)
            .map_err(D::Error::custom)
    }
}

fn encode_definition<K: DimensionKind>(
    definition: &DimensionDefinition<K::Meta>,
) -> Result<Value, LedgerError> {
    let mut encoded = serde_json::to_value(definition).map_err(ser_error::<K>)?;
    if let Value::Object(fields) = &mut encoded {
        if let Some(subranges) = fields.remove(SUBRANGES_FIELD) {
            fields.insert(K::SUBRANGE_KEY.to_owned(), subranges);
        }
    }
    Ok(encoded)
}

fn decode_definition<K: DimensionKind>(
    raw: &Value,
) -> Result<DimensionDefinition<K::Meta>, LedgerError> {
    let mut fields = raw
        .as_object()
        .cloned()
        .ok_or_else(|| de_error::<K>(format!("{} definition is not an object", K::NOUN)))?;
    if fields.contains_key(SUBRANGES_FIELD) {
        return Err(de_error::<K>(format!(
            "{} definition lists `{SUBRANGES_FIELD}`; expected `{}`",
            K::NOUN,
            K::SUBRANGE_KEY
        )));
    }
    if let Some(subranges) = fields.remove(K::SUBRANGE_KEY) {
        fields.insert(SUBRANGES_FIELD.to_owned(), subranges);
    }
    serde_json::from_value(Value::Object(fields)).map_err(de_error::<K>)
}

fn decode_definitions<K: DimensionKind>(
    raw: &Value,
) -> Result<Vec<DimensionDefinition<K::Meta>>, LedgerError> {
    raw.as_array()
        .ok_or_else(|| de_error::<K>(format!("`{}` is not a list", K::COLLECTION_KEY)))?
        .iter()
        .map(decode_definition::<K>)
        .collect()
}

/// Legacy `{ "political": { ... }, ... }` form; a missing `id` is taken from
/// the key.
fn decode_keyed_definitions<K: DimensionKind>(
    by_id: &Map<String, Value>,
) -> Result<Vec<DimensionDefinition<K::Meta>>, LedgerError> {
    by_id
        .iter()
        .map(|(id, raw)| {
            let mut raw = raw.clone();
            if let Value::Object(fields) = &mut raw {
                fields
                    .entry("id")
                    .or_insert_with(|| Value::String(id.clone()));
            }
            decode_definition::<K>(&raw)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Values and history
// ---------------------------------------------------------------------------

fn decode_values<K: DimensionKind>(raw: Option<&Value>) -> Result<BTreeMap<String, f64>, LedgerError> {
    match raw {
        None | Some(Value::Null) => Ok(BTreeMap::new()),
        Some(v) => serde_json::from_value(v.clone()).map_err(de_error::<K>),
    }
}

fn decode_history<K: DimensionKind>(
    raw: Option<&Value>,
) -> Result<BTreeMap<String, Vec<ChangeRecord>>, LedgerError> {
    match raw {
        None | Some(Value::Null) => Ok(BTreeMap::new()),
        Some(v) => serde_json::from_value(v.clone()).map_err(de_error::<K>),
    }
}

fn de_error<K: DimensionKind>(reason: impl ToString) -> LedgerError {
    LedgerError::Deserialization {
        noun: K::NOUN,
        reason: reason.to_string(),
    }
}

fn ser_error<K: DimensionKind>(err: serde_json::Error) -> LedgerError {
    LedgerError::Serialization {
        noun: K::NOUN,
        reason: err.to_string(),
    }
}
