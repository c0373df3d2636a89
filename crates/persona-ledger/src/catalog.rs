//! Dimension definitions and the validated catalog.
//!
//! A [`DimensionCatalog`] is built once through [`CatalogBuilder`] and never
//! changes afterwards. The builder checks every definition up front and
//! reports every broken rule at once.
//!
//! Subranges are deliberately *not* checked for contiguity or overlap.
//! Classification walks them in declaration order, returns the first one
//! containing the value (both bounds inclusive), and returns `None` when
//! the value falls into a gap. Some catalogs leave dead zones on purpose.

use std::collections::{BTreeMap, BTreeSet};
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::kinds::DimensionKind;
use crate::{CatalogViolation, ConfigurationError};

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// A named band `[min, max]` inside a dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subrange<M> {
    /// Display name (`"Medium"`, `"Renowned"`, `"Virtuous"`).
    pub name: String,
    /// Inclusive lower bound.
    pub min: f64,
    /// Inclusive upper bound.
    pub max: f64,
    /// Kind-specific metadata.
    #[serde(flatten)]
    pub meta: M,
}

impl<M> Subrange<M> {
    /// Create a subrange.
    pub fn new(name: impl Into<String>, min: f64, max: f64, meta: M) -> Self {
        Self {
            name: name.into(),
            min,
            max,
            meta,
        }
    }

    /// Whether `value` lies inside the band, bounds included.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Static configuration of one dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionDefinition<M> {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Lowest allowed value.
    pub min: f64,
    /// Highest allowed value.
    pub max: f64,
    /// Value a new ledger starts at.
    pub default_value: f64,
    /// Ordered classification bands. Snapshots and config files carry them
    /// under the kind's own key; see [`KindDefinition`](crate::codec::KindDefinition).
    #[serde(default = "Vec::new")]
    pub subranges: Vec<Subrange<M>>,
}

impl<M> DimensionDefinition<M> {
    /// Start a definition with no description and no subranges.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        min: f64,
        max: f64,
        default_value: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            min,
            max,
            default_value,
            subranges: Vec::new(),
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append a subrange.
    #[must_use]
    pub fn with_subrange(mut self, name: impl Into<String>, min: f64, max: f64, meta: M) -> Self {
        self.subranges.push(Subrange::new(name, min, max, meta));
        self
    }

    /// First subrange containing `value`, in declaration order.
    pub fn classify(&self, value: f64) -> Option<&Subrange<M>> {
        self.subranges.iter().find(|s| s.contains(value))
    }

    /// Clamp `raw` into `[min, max]` as `max(min, min(max, raw))`.
    pub fn clamp(&self, raw: f64) -> f64 {
        self.min.max(self.max.min(raw))
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// A validated, immutable set of dimension definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionCatalog<K: DimensionKind> {
    /// Definitions in declaration order.
    definitions: Vec<DimensionDefinition<K::Meta>>,
    /// id -> position in `definitions`.
    index: BTreeMap<String, usize>,
    kind: PhantomData<K>,
}

impl<K: DimensionKind> DimensionCatalog<K> {
    /// Validate `definitions` and build a catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] listing every violated rule.
    pub fn new(definitions: Vec<DimensionDefinition<K::Meta>>) -> Result<Self, ConfigurationError> {
        CatalogBuilder::new().dimensions(definitions).build()
    }

    /// Start a builder.
    pub const fn builder() -> CatalogBuilder<K> {
        CatalogBuilder::new()
    }

    /// All definitions in declaration order.
    pub fn definitions(&self) -> &[DimensionDefinition<K::Meta>] {
        &self.definitions
    }

    /// Look up a definition by id.
    pub fn definition(&self, id: &str) -> Option<&DimensionDefinition<K::Meta>> {
        self.index
            .get(id)
            .and_then(|&position| self.definitions.get(position))
    }

    /// Whether the catalog defines `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Dimension ids in declaration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.definitions.iter().map(|d| d.id.as_str())
    }

    /// Number of dimensions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Always `false` for a validated catalog; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Classify `value` against dimension `id`.
    ///
    /// Returns `None` when the id is unknown or the value falls in a gap.
    pub fn classify(&self, id: &str, value: f64) -> Option<&Subrange<K::Meta>> {
        self.definition(id).and_then(|d| d.classify(value))
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for a validated [`DimensionCatalog`].
///
/// # Examples
///
/// ```
/// use persona_ledger::{CatalogBuilder, DimensionDefinition, Domain, TierInfo};
///
/// let catalog = CatalogBuilder::<Domain>::new()
///     .dimension(
///         DimensionDefinition::new("trade", "Trade", 0.0, 10.0, 0.0)
///             .with_subrange("Any", 0.0, 10.0, TierInfo::default()),
///     )
///     .build();
///
/// assert!(catalog.is_ok());
/// ```
#[derive(Debug)]
pub struct CatalogBuilder<K: DimensionKind> {
    definitions: Vec<DimensionDefinition<K::Meta>>,
}

impl<K: DimensionKind> Default for CatalogBuilder<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: DimensionKind> CatalogBuilder<K> {
    /// Start an empty builder.
    pub const fn new() -> Self {
        Self {
            definitions: Vec::new(),
        }
    }

    /// Add one definition.
    #[must_use]
    pub fn dimension(mut self, definition: DimensionDefinition<K::Meta>) -> Self {
        self.definitions.push(definition);
        self
    }

    /// Add several definitions.
    #[must_use]
    pub fn dimensions(
        mut self,
        definitions: impl IntoIterator<Item = DimensionDefinition<K::Meta>>,
    ) -> Self {
        self.definitions.extend(definitions);
        self
    }

    /// Validate every definition and produce the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] with one [`CatalogViolation`] per
    /// broken rule when any definition is invalid.
    pub fn build(self) -> Result<DimensionCatalog<K>, ConfigurationError> {
        let violations = validate_definitions::<K>(&self.definitions);
        if !violations.is_empty() {
            return Err(ConfigurationError {
                noun: K::NOUN,
                violations,
            });
        }

        let index = self
            .definitions
            .iter()
            .enumerate()
            .map(|(position, d)| (d.id.clone(), position))
            .collect();

        Ok(DimensionCatalog {
            definitions: self.definitions,
            index,
            kind: PhantomData,
        })
    }
}

/// Check every catalog rule and collect all violations.
fn validate_definitions<K: DimensionKind>(
    definitions: &[DimensionDefinition<K::Meta>],
) -> Vec<CatalogViolation> {
    let mut violations = Vec::new();

    if definitions.is_empty() {
        violations.push(CatalogViolation::Empty);
        return violations;
    }

    let mut seen: BTreeSet<&str> = BTreeSet::new();

    for (index, def) in definitions.iter().enumerate() {
        if def.id.trim().is_empty() {
            violations.push(CatalogViolation::MissingId { index });
        } else if !seen.insert(def.id.as_str()) {
            violations.push(CatalogViolation::DuplicateId { id: def.id.clone() });
        }

        if def.name.trim().is_empty() {
            violations.push(CatalogViolation::MissingName { id: def.id.clone() });
        }

        // NaN fails every comparison, so it lands here too.
        let range_ok = def.min < def.max && def.min.is_finite() && def.max.is_finite();
        if !range_ok {
            violations.push(CatalogViolation::InvalidRange {
                id: def.id.clone(),
                min: def.min,
                max: def.max,
            });
        } else if !(def.min..=def.max).contains(&def.default_value) {
            violations.push(CatalogViolation::DefaultOutOfRange {
                id: def.id.clone(),
                default_value: def.default_value,
                min: def.min,
                max: def.max,
            });
        }

        if def.subranges.is_empty() {
            violations.push(CatalogViolation::NoSubranges {
                id: def.id.clone(),
                subrange_key: K::SUBRANGE_KEY,
            });
        }

        for sub in &def.subranges {
            let sub_ok = sub.min < sub.max && sub.min.is_finite() && sub.max.is_finite();
            if !sub_ok {
                violations.push(CatalogViolation::InvalidSubrange {
                    id: def.id.clone(),
                    subrange: sub.name.clone(),
                    min: sub.min,
                    max: sub.max,
                });
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::{Domain, TierInfo};

    fn tier(name: &str, min: f64, max: f64) -> Subrange<TierInfo> {
        Subrange::new(name, min, max, TierInfo::default())
    }

    fn gapped() -> DimensionDefinition<TierInfo> {
        let mut def = DimensionDefinition::new("court", "Court", 0.0, 100.0, 0.0);
        def.subranges = vec![tier("Low", 0.0, 20.0), tier("High", 50.0, 100.0)];
        def
    }

    #[test]
    fn valid_catalog_builds() {
        let catalog = DimensionCatalog::<Domain>::new(vec![gapped()]);
        assert!(catalog.is_ok());
        assert_eq!(catalog.map(|c| c.len()).ok(), Some(1));
    }

    #[test]
    fn empty_catalog_rejected() {
        let err = DimensionCatalog::<Domain>::new(Vec::new()).err();
        assert_eq!(
            err.map(|e| e.violations),
            Some(vec![CatalogViolation::Empty])
        );
    }

    #[test]
    fn every_violation_is_reported() {
        let mut bad_range = DimensionDefinition::new("a", "", 10.0, 10.0, 10.0);
        bad_range.subranges = vec![tier("Flat", 5.0, 5.0)];
        let mut bad_default = DimensionDefinition::new("b", "B", 0.0, 10.0, 11.0);
        bad_default.subranges = vec![tier("All", 0.0, 10.0)];
        let no_tiers = DimensionDefinition::new("b", "B again", 0.0, 10.0, 0.0);
        let no_id = DimensionDefinition::<TierInfo>::new("", "Nameless", 0.0, 1.0, 0.0)
            .with_subrange("All", 0.0, 1.0, TierInfo::default());

        let err = CatalogBuilder::<Domain>::new()
            .dimensions([bad_range, bad_default, no_tiers, no_id])
            .build()
            .err();

        let violations = err.map(|e| e.violations).unwrap_or_default();
        assert!(violations.contains(&CatalogViolation::MissingName { id: "a".to_owned() }));
        assert!(violations.iter().any(|v| matches!(v, CatalogViolation::InvalidRange { .. })));
        assert!(violations.iter().any(|v| matches!(v, CatalogViolation::InvalidSubrange { .. })));
        assert!(violations.iter().any(|v| matches!(v, CatalogViolation::DefaultOutOfRange { .. })));
        assert!(violations.contains(&CatalogViolation::DuplicateId { id: "b".to_owned() }));
        assert!(violations.iter().any(|v| matches!(v, CatalogViolation::NoSubranges { .. })));
        assert!(violations.contains(&CatalogViolation::MissingId { index: 3 }));
    }

    #[test]
    fn nan_bounds_are_invalid() {
        let def = DimensionDefinition::new("n", "N", f64::NAN, 1.0, 0.5)
            .with_subrange("All", 0.0, 1.0, TierInfo::default());
        assert!(DimensionCatalog::<Domain>::new(vec![def]).is_err());
    }

    #[test]
    fn infinite_subrange_bounds_are_invalid() {
        let open_top = DimensionDefinition::new("o", "Open", 0.0, 10.0, 0.0)
            .with_subrange("Open", 0.0, f64::INFINITY, TierInfo::default());
        let open_bottom = DimensionDefinition::new("p", "Floor", 0.0, 10.0, 0.0)
            .with_subrange("Floor", f64::NEG_INFINITY, 10.0, TierInfo::default());

        let violations = DimensionCatalog::<Domain>::new(vec![open_top, open_bottom])
            .err()
            .map(|e| e.violations)
            .unwrap_or_default();
        let invalid: Vec<&str> = violations
            .iter()
            .filter_map(|v| match v {
                CatalogViolation::InvalidSubrange { subrange, .. } => Some(subrange.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(invalid, ["Open", "Floor"]);
    }

    #[test]
    fn classification_is_inclusive_first_match_and_gap_tolerant() {
        let mut def = gapped();
        def.subranges.push(tier("Shadowed", 10.0, 60.0));

        assert_eq!(def.classify(0.0).map(|s| s.name.as_str()), Some("Low"));
        assert_eq!(def.classify(20.0).map(|s| s.name.as_str()), Some("Low"));
        // 15 is in both Low and Shadowed; declaration order wins.
        assert_eq!(def.classify(15.0).map(|s| s.name.as_str()), Some("Low"));
        // 30 sits in the Low/High gap, but Shadowed catches it.
        assert_eq!(def.classify(30.0).map(|s| s.name.as_str()), Some("Shadowed"));

        let plain = gapped();
        assert!(plain.classify(35.0).is_none());
        assert_eq!(plain.classify(50.0).map(|s| s.name.as_str()), Some("High"));
    }

    #[test]
    fn clamp_uses_bounds() {
        let def = gapped();
        assert!((def.clamp(150.0) - 100.0).abs() < f64::EPSILON);
        assert!((def.clamp(-3.0) - 0.0).abs() < f64::EPSILON);
        assert!((def.clamp(42.5) - 42.5).abs() < f64::EPSILON);
    }

    #[test]
    fn catalog_lookup_by_id() {
        let catalog = DimensionCatalog::<Domain>::new(vec![gapped()]).ok();
        assert!(catalog.as_ref().is_some_and(|c| c.contains("court")));
        assert!(catalog.as_ref().is_some_and(|c| !c.contains("guild")));
        assert_eq!(
            catalog.as_ref().and_then(|c| c.classify("court", 75.0)).map(|s| s.name.clone()),
            Some("High".to_owned())
        );
        assert!(catalog.as_ref().and_then(|c| c.classify("guild", 75.0)).is_none());
    }
}
