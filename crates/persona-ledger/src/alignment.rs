//! Alignment: position on the moral and ethical axes.
//!
//! Each zone lists the effects active while an axis sits inside it.
//! Effects are opaque tags for the caller to interpret.

use crate::catalog::{CatalogBuilder, DimensionCatalog, DimensionDefinition, Subrange};
use crate::kinds::{Axis, ZoneInfo};
use crate::{Alignment, ConfigurationError, LedgerError};

type ZoneRow = (&'static str, f64, f64, &'static str, &'static [&'static str]);

const MORAL_ZONES: [ZoneRow; 5] = [
    ("Villainous", -100.0, -60.0, "Cruel by habit", &["feared", "shunned_by_clergy"]),
    ("Callous", -59.0, -20.0, "Indifferent to harm", &["distrusted"]),
    ("Neutral", -19.0, 19.0, "Neither saint nor sinner", &[]),
    ("Principled", 20.0, 59.0, "Kind when it counts", &["trusted"]),
    ("Virtuous", 60.0, 100.0, "Selfless to a fault", &["trusted", "blessed"]),
];

const ETHICAL_ZONES: [ZoneRow; 5] = [
    ("Anarchic", -100.0, -60.0, "Rejects every rule", &["outlaw", "unpredictable"]),
    ("Rebellious", -59.0, -20.0, "Bends rules freely", &["unpredictable"]),
    ("Neutral", -19.0, 19.0, "Follows rules when convenient", &[]),
    ("Orderly", 20.0, 59.0, "Keeps their word", &["reliable"]),
    ("Lawful", 60.0, 100.0, "Bound by code and oath", &["reliable", "rigid"]),
];

/// The built-in axes: `moral` (evil to good) and `ethical` (chaos to law),
/// each ranging over `[-100, 100]` with default `0`.
///
/// # Errors
///
/// Returns [`ConfigurationError`] if the built-in definitions are invalid.
pub fn default_axes() -> Result<DimensionCatalog<Axis>, ConfigurationError> {
    CatalogBuilder::<Axis>::new()
        .dimension(axis("moral", "Moral", "Good versus evil", &MORAL_ZONES))
        .dimension(axis("ethical", "Ethical", "Law versus chaos", &ETHICAL_ZONES))
        .build()
}

fn axis(id: &str, name: &str, description: &str, zones: &[ZoneRow]) -> DimensionDefinition<ZoneInfo> {
    zones.iter().fold(
        DimensionDefinition::new(id, name, -100.0, 100.0, 0.0).with_description(description),
        |def, (zone, min, max, text, effects)| {
            def.with_subrange(
                *zone,
                *min,
                *max,
                ZoneInfo {
                    description: (*text).to_owned(),
                    effects: effects.iter().map(|e| (*e).to_owned()).collect(),
                },
            )
        },
    )
}

impl Alignment {
    /// A ledger over [`default_axes`] with both axes at zero.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Configuration`] if the built-in catalog is
    /// invalid.
    pub fn with_default_axes() -> Result<Self, LedgerError> {
        Ok(Self::new(default_axes()?))
    }

    /// The zone the axis's current value falls in.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownDimension`] if `axis` is not in the
    /// catalog.
    pub fn zone(&self, axis: &str) -> Result<Option<&Subrange<ZoneInfo>>, LedgerError> {
        self.classify(axis)
    }

    /// Effects of every axis's current zone, in axis order. Duplicates are
    /// kept; axes sitting in a gap contribute nothing.
    pub fn active_effects(&self) -> Vec<&str> {
        self.catalog
            .definitions()
            .iter()
            .filter_map(|d| self.values.get(&d.id).and_then(|v| d.classify(*v)))
            .flat_map(|zone| zone.meta.effects.iter().map(String::as_str))
            .collect()
    }
}
