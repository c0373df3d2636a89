//! The immutable ledger snapshot.
//!
//! A [`Ledger`] holds the current value of every dimension in its catalog
//! plus each dimension's change history.
//!
//! # Design
//!
//! - **Immutable**: [`with_change`] and [`with_decay`] return new snapshots.
//! - **Bounded**: values always lie in their dimension's `[min, max]`.
//! - **Append-only**: history records are never edited or removed.
//! - **Shared**: the catalog and untouched histories are reference-counted
//!   between snapshots; only the changed dimension's history is copied.
//!
//! [`with_change`]: Ledger::with_change
//! [`with_decay`]: Ledger::with_decay

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use persona_types::{ChangeContext, ChangeRecord};

use crate::LedgerError;
use crate::catalog::{DimensionCatalog, DimensionDefinition, Subrange};
use crate::kinds::{Decaying, DimensionKind};

/// Reason recorded on every decay entry.
pub const DECAY_REASON: &str = "Time decay";

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Current values and change history for one catalog of dimensions.
///
/// Equality is structural: two ledgers are equal when their catalogs,
/// values, and histories (timestamps included) are equal.
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger<K: DimensionKind> {
    pub(crate) catalog: Arc<DimensionCatalog<K>>,
    /// Exactly one entry per catalog dimension.
    pub(crate) values: BTreeMap<String, f64>,
    /// Exactly one entry per catalog dimension, possibly empty.
    pub(crate) history: BTreeMap<String, Arc<[ChangeRecord]>>,
}

impl<K: DimensionKind> Ledger<K> {
    /// Create a ledger with every dimension at its default value.
    pub fn new(catalog: DimensionCatalog<K>) -> Self {
        let values = catalog
            .definitions()
            .iter()
            .map(|d| (d.id.clone(), d.default_value))
            .collect();
        let history = empty_history(&catalog);
        Self {
            catalog: Arc::new(catalog),
            values,
            history,
        }
    }

    /// Create a ledger with some initial values; omitted dimensions start at
    /// their default. Out-of-range values are clamped into range.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownDimension`] for an id outside the
    /// catalog and [`LedgerError::NonFiniteNumber`] for NaN or infinite
    /// values.
    pub fn with_values(
        catalog: DimensionCatalog<K>,
        initial: impl IntoIterator<Item = (String, f64)>,
    ) -> Result<Self, LedgerError> {
        let mut ledger = Self::new(catalog);
        for (id, value) in initial {
            let def = ledger.require(&id)?;
            if !value.is_finite() {
                return Err(LedgerError::NonFiniteNumber {
                    id,
                    what: "value",
                    value,
                });
            }
            let clamped = def.clamp(value);
            if clamped < value || clamped > value {
                warn!(
                    kind = K::NOUN,
                    dimension = %id,
                    value,
                    clamped,
                    "initial value outside range, clamped"
                );
            }
            ledger.values.insert(id, clamped);
        }
        Ok(ledger)
    }

    /// Rebuild a ledger from decoded parts. Used by the codec.
    pub(crate) fn restore(
        catalog: DimensionCatalog<K>,
        values: BTreeMap<String, f64>,
        history: BTreeMap<String, Vec<ChangeRecord>>,
    ) -> Result<Self, LedgerError> {
        if let Some(id) = history.keys().find(|id| !catalog.contains(id)) {
            return Err(LedgerError::Deserialization {
                noun: K::NOUN,
                reason: format!("history for unknown {} `{id}`", K::NOUN),
            });
        }
        if let Some(id) = values.keys().find(|id| !catalog.contains(id)) {
            return Err(LedgerError::Deserialization {
                noun: K::NOUN,
                reason: format!("value for unknown {} `{id}`", K::NOUN),
            });
        }

        let mut ledger = Self::with_values(catalog, values)?;
        for (id, records) in history {
            ledger.history.insert(id, Arc::from(records));
        }
        Ok(ledger)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// The catalog this ledger tracks.
    pub fn catalog(&self) -> &DimensionCatalog<K> {
        &self.catalog
    }

    /// The definition of dimension `id`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownDimension`] if `id` is not in the catalog.
    pub fn definition(&self, id: &str) -> Result<&DimensionDefinition<K::Meta>, LedgerError> {
        self.require(id)
    }

    /// Current value of dimension `id`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownDimension`] if `id` is not in the catalog.
    pub fn value(&self, id: &str) -> Result<f64, LedgerError> {
        self.values
            .get(id)
            .copied()
            .ok_or_else(|| unknown::<K>(id))
    }

    /// All current values, keyed by dimension id.
    pub const fn values(&self) -> &BTreeMap<String, f64> {
        &self.values
    }

    /// The subrange the current value of `id` falls in.
    ///
    /// Returns `Ok(None)` when the value sits in a gap between subranges.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownDimension`] if `id` is not in the catalog.
    pub fn classify(&self, id: &str) -> Result<Option<&Subrange<K::Meta>>, LedgerError> {
        let def = self.require(id)?;
        let value = self.value(id)?;
        Ok(def.classify(value))
    }

    /// Full change history of `id`, oldest first. Empty if nothing changed.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownDimension`] if `id` is not in the catalog.
    pub fn history(&self, id: &str) -> Result<&[ChangeRecord], LedgerError> {
        self.history
            .get(id)
            .map(|h| &**h)
            .ok_or_else(|| unknown::<K>(id))
    }

    /// The most recent change to `id`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownDimension`] if `id` is not in the catalog.
    pub fn last_change(&self, id: &str) -> Result<Option<&ChangeRecord>, LedgerError> {
        self.history(id).map(<[ChangeRecord]>::last)
    }

    /// Total number of records across all dimensions.
    pub fn history_len(&self) -> usize {
        self.history.values().map(|h| h.len()).sum()
    }

    // -----------------------------------------------------------------------
    // Changes
    // -----------------------------------------------------------------------

    /// Apply `delta` to dimension `id`, timestamped now.
    ///
    /// See [`with_change_at`](Self::with_change_at).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownDimension`] or
    /// [`LedgerError::NonFiniteNumber`].
    pub fn with_change(
        &self,
        id: &str,
        delta: f64,
        reason: impl Into<String>,
        context: Option<ChangeContext>,
    ) -> Result<Self, LedgerError> {
        self.with_change_at(id, delta, reason, context, Utc::now())
    }

    /// Apply `delta` to dimension `id` and return the new snapshot.
    ///
    /// The new value is `max(min, min(max, current + delta))`. The appended
    /// record stores the requested `delta` unchanged next to the clamped
    /// `resulting_value`, so callers can see both the attempted and the
    /// effective change.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownDimension`] if `id` is not in the
    /// catalog, or [`LedgerError::NonFiniteNumber`] if `delta` is NaN or
    /// infinite.
    pub fn with_change_at(
        &self,
        id: &str,
        delta: f64,
        reason: impl Into<String>,
        context: Option<ChangeContext>,
        at: DateTime<Utc>,
    ) -> Result<Self, LedgerError> {
        let def = self.require(id)?;
        if !delta.is_finite() {
            return Err(LedgerError::NonFiniteNumber {
                id: id.to_owned(),
                what: "delta",
                value: delta,
            });
        }

        let current = self.value(id)?;
        let raw = current + delta;
        let resulting = def.clamp(raw);
        if resulting < raw || resulting > raw {
            debug!(kind = K::NOUN, dimension = id, raw, resulting, "change clamped");
        }

        let record = ChangeRecord::new(at, delta, resulting, reason, context);
        Ok(self.with_record(id, resulting, record))
    }

    /// Copy of `self` with one value replaced and one record appended.
    fn with_record(&self, id: &str, value: f64, record: ChangeRecord) -> Self {
        let mut values = self.values.clone();
        values.insert(id.to_owned(), value);

        let mut history = self.history.clone();
        let mut records = history
            .get(id)
            .map(|h| h.to_vec())
            .unwrap_or_default();
        records.push(record);
        history.insert(id.to_owned(), Arc::from(records));

        Self {
            catalog: Arc::clone(&self.catalog),
            values,
            history,
        }
    }

    fn require(&self, id: &str) -> Result<&DimensionDefinition<K::Meta>, LedgerError> {
        self.catalog.definition(id).ok_or_else(|| unknown::<K>(id))
    }
}

// ---------------------------------------------------------------------------
// Decay
// ---------------------------------------------------------------------------

impl<K: Decaying> Ledger<K> {
    /// Decay dimensions toward their floor, timestamped now.
    ///
    /// See [`with_decay_at`](Self::with_decay_at).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidDecay`] if any amount is negative or
    /// not finite.
    pub fn with_decay<'a>(
        &self,
        rates: impl IntoIterator<Item = (&'a str, f64)>,
    ) -> Result<Self, LedgerError> {
        self.with_decay_at(rates, Utc::now())
    }

    /// Subtract each `(id, amount)` from its dimension, never going below
    /// the dimension's minimum and never raising a value.
    ///
    /// Every amount is validated before any dimension is touched, so a
    /// single bad entry rejects the whole call. A `"Time decay"` record is
    /// appended only when the value actually moved; decaying a dimension
    /// that already sits at its floor leaves its history alone. Ids that are
    /// not in the catalog are skipped, since decay schedules are often shared
    /// across catalogs.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidDecay`] if any amount is negative or
    /// not finite.
    pub fn with_decay_at<'a>(
        &self,
        rates: impl IntoIterator<Item = (&'a str, f64)>,
        at: DateTime<Utc>,
    ) -> Result<Self, LedgerError> {
        let rates: Vec<(&str, f64)> = rates.into_iter().collect();

        if let Some((id, amount)) = rates
            .iter()
            .find(|(_, amount)| !amount.is_finite() || *amount < 0.0)
        {
            return Err(LedgerError::InvalidDecay {
                id: (*id).to_owned(),
                amount: *amount,
            });
        }

        let mut next = self.clone();
        for (id, amount) in rates {
            let Some(def) = self.catalog.definition(id) else {
                debug!(kind = K::NOUN, dimension = id, "decay for unknown dimension skipped");
                continue;
            };

            let current = next.value(id)?;
            let decayed = def.min.max(current - amount);
            if decayed < current {
                let record = ChangeRecord::new(at, -amount, decayed, DECAY_REASON, None);
                next = next.with_record(id, decayed, record);
            }
        }

        Ok(next)
    }
}

fn empty_history<K: DimensionKind>(
    catalog: &DimensionCatalog<K>,
) -> BTreeMap<String, Arc<[ChangeRecord]>> {
    catalog
        .ids()
        .map(|id| (id.to_owned(), Arc::from(Vec::new())))
        .collect()
}

fn unknown<K: DimensionKind>(id: &str) -> LedgerError {
    LedgerError::UnknownDimension {
        noun: K::NOUN,
        id: id.to_owned(),
    }
}
