//! Influence: standing in the political, economic, and social domains.

use crate::catalog::{CatalogBuilder, DimensionCatalog, DimensionDefinition, Subrange};
use crate::kinds::{Domain, TierInfo};
use crate::{ConfigurationError, Influence, LedgerError};

/// Tier bands shared by every default domain.
const DEFAULT_TIERS: [(&str, f64, f64, &str); 5] = [
    ("None", 0.0, 9.0, "No meaningful sway"),
    ("Low", 10.0, 29.0, "Known to a few, heeded by fewer"),
    ("Medium", 30.0, 59.0, "A recognised voice"),
    ("High", 60.0, 89.0, "Shapes outcomes in the domain"),
    ("VeryHigh", 90.0, 100.0, "Dominates the domain"),
];

/// The built-in domains: `political`, `economic`, and `social`, each ranging
/// over `[0, 100]` with default `10`.
///
/// # Errors
///
/// Returns [`ConfigurationError`] if the built-in definitions are invalid.
pub fn default_domains() -> Result<DimensionCatalog<Domain>, ConfigurationError> {
    CatalogBuilder::<Domain>::new()
        .dimension(domain("political", "Political", "Sway over rulers and law"))
        .dimension(domain("economic", "Economic", "Sway over trade and coin"))
        .dimension(domain("social", "Social", "Sway over gossip and favour"))
        .build()
}

fn domain(id: &str, name: &str, description: &str) -> DimensionDefinition<TierInfo> {
    DEFAULT_TIERS.iter().fold(
        DimensionDefinition::new(id, name, 0.0, 100.0, 10.0).with_description(description),
        |def, (tier, min, max, text)| {
            def.with_subrange(
                *tier,
                *min,
                *max,
                TierInfo {
                    description: (*text).to_owned(),
                },
            )
        },
    )
}

impl Influence {
    /// A ledger over [`default_domains`] with every domain at its default.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Configuration`] if the built-in catalog is
    /// invalid.
    pub fn with_default_domains() -> Result<Self, LedgerError> {
        Ok(Self::new(default_domains()?))
    }

    /// The tier the domain's current value falls in.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownDimension`] if `domain` is not in the
    /// catalog.
    pub fn tier(&self, domain: &str) -> Result<Option<&Subrange<TierInfo>>, LedgerError> {
        self.classify(domain)
    }

    /// The domain with the highest current value. Ties go to the domain
    /// declared first.
    pub fn dominant_domain(&self) -> Option<(&str, f64)> {
        self.catalog
            .definitions()
            .iter()
            .filter_map(|d| self.values.get(&d.id).map(|v| (d.id.as_str(), *v)))
            .fold(None, |best, (id, value)| match best {
                Some((_, top)) if top >= value => best,
                _ => Some((id, value)),
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_domains_start_at_low() {
        let influence = Influence::with_default_domains().unwrap();
        for id in ["political", "economic", "social"] {
            assert!((influence.value(id).unwrap() - 10.0).abs() < f64::EPSILON);
            assert_eq!(influence.tier(id).unwrap().unwrap().name, "Low");
        }
    }

    #[test]
    fn tier_carries_description() {
        let influence = Influence::with_default_domains()
            .unwrap()
            .with_change("economic", 85.0, "monopoly", None)
            .unwrap();
        let tier = influence.tier("economic").unwrap().unwrap();
        assert_eq!(tier.name, "VeryHigh");
        assert_eq!(tier.meta.description, "Dominates the domain");
    }

    #[test]
    fn dominant_domain_prefers_highest_then_first() {
        let influence = Influence::with_default_domains().unwrap();
        assert_eq!(influence.dominant_domain(), Some(("political", 10.0)));

        let influence = influence.with_change("social", 5.0, "ball", None).unwrap();
        assert_eq!(influence.dominant_domain(), Some(("social", 15.0)));
    }
}
