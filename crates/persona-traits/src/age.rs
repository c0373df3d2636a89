//! Age modifiers.
//!
//! A pure function of age, independent of event evolution. Piecewise tables
//! give four modifiers, any of which a caller may override:
//!
//! | Age   | Wisdom | Volatility | Adaptability |
//! |-------|--------|------------|--------------|
//! | 0-19  | +0     | x1.2       | x1.2         |
//! | 20-39 | +1     | x1.0       | x1.0         |
//! | 40-59 | +2     | x0.85      | x0.9         |
//! | 60+   | +3     | x0.7       | x0.75        |
//!
//! Physical decline lowers strength, dexterity, and constitution by 1 from
//! 40, 2 from 60, and 3 from 75, never below 3. Wisdom never rises above 20.

use serde::{Deserialize, Serialize};

use crate::profile::PersonalityProfile;

/// Highest wisdom the age bonus can reach.
pub const WISDOM_CAP: i32 = 20;

/// Lowest score physical decline can reach.
pub const PHYSICAL_FLOOR: i32 = 3;

/// Attribute id receiving the wisdom bonus.
pub const WISDOM: &str = "wisdom";

/// Attribute ids subject to physical decline.
pub const PHYSICAL_ATTRIBUTES: [&str; 3] = ["strength", "dexterity", "constitution"];

// (first age of the band, value)
const WISDOM_BONUS: [(u32, i32); 4] = [(0, 0), (20, 1), (40, 2), (60, 3)];
const VOLATILITY_FACTOR: [(u32, f64); 4] = [(0, 1.2), (20, 1.0), (40, 0.85), (60, 0.7)];
const ADAPTABILITY_FACTOR: [(u32, f64); 4] = [(0, 1.2), (20, 1.0), (40, 0.9), (60, 0.75)];
const PHYSICAL_DECLINE: [(u32, i32); 4] = [(0, 0), (40, 1), (60, 2), (75, 3)];

fn band<T: Copy>(table: &[(u32, T)], age: u32, fallback: T) -> T {
    table
        .iter()
        .rev()
        .find(|(from, _)| age >= *from)
        .map_or(fallback, |(_, value)| *value)
}

/// The four age-dependent modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeModifiers {
    /// Points added to wisdom.
    pub wisdom_bonus: i32,
    /// Factor applied to trait and emotional volatility.
    pub volatility_factor: f64,
    /// Factor applied to cognitive adaptability.
    pub adaptability_factor: f64,
    /// Points removed from each physical attribute.
    pub physical_decline: i32,
}

impl AgeModifiers {
    /// Table values for `age`.
    pub fn for_age(age: u32) -> Self {
        Self {
            wisdom_bonus: band(&WISDOM_BONUS, age, 0),
            volatility_factor: band(&VOLATILITY_FACTOR, age, 1.0),
            adaptability_factor: band(&ADAPTABILITY_FACTOR, age, 1.0),
            physical_decline: band(&PHYSICAL_DECLINE, age, 0),
        }
    }

    /// Replace any value the caller overrides.
    #[must_use]
    pub fn merged(self, overrides: &AgeModifierOverrides) -> Self {
        Self {
            wisdom_bonus: overrides.wisdom_bonus.unwrap_or(self.wisdom_bonus),
            volatility_factor: overrides.volatility_factor.unwrap_or(self.volatility_factor),
            adaptability_factor: overrides
                .adaptability_factor
                .unwrap_or(self.adaptability_factor),
            physical_decline: overrides.physical_decline.unwrap_or(self.physical_decline),
        }
    }
}

/// Caller overrides for [`AgeModifiers`]. Unset fields keep the table value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgeModifierOverrides {
    /// Replacement wisdom bonus.
    pub wisdom_bonus: Option<i32>,
    /// Replacement volatility factor.
    pub volatility_factor: Option<f64>,
    /// Replacement adaptability factor.
    pub adaptability_factor: Option<f64>,
    /// Replacement physical decline.
    pub physical_decline: Option<i32>,
}

/// Non-finite or negative factors leave the score alone.
fn usable_factor(factor: f64) -> f64 {
    if factor.is_finite() && factor >= 0.0 {
        factor
    } else {
        1.0
    }
}

impl PersonalityProfile {
    /// Apply the modifiers for `age`, merged with `overrides`.
    ///
    /// Applies to the profile as given; calling it twice compounds the
    /// factors.
    pub fn with_age_modifiers(&self, age: u32, overrides: Option<&AgeModifierOverrides>) -> Self {
        let modifiers = overrides.map_or_else(
            || AgeModifiers::for_age(age),
            |o| AgeModifiers::for_age(age).merged(o),
        );
        tracing::debug!(age, ?modifiers, "applying age modifiers");

        let mut next = self.clone();

        if modifiers.wisdom_bonus != 0
            && let Some(wisdom) = next.attributes.get_mut(WISDOM)
        {
            let raised = wisdom.base_value.saturating_add(modifiers.wisdom_bonus);
            wisdom.base_value = raised.min(WISDOM_CAP.max(wisdom.base_value));
        }

        if modifiers.physical_decline != 0 {
            for id in PHYSICAL_ATTRIBUTES {
                if let Some(attribute) = next.attributes.get_mut(id) {
                    let lowered = attribute.base_value.saturating_sub(modifiers.physical_decline);
                    attribute.base_value = lowered.max(PHYSICAL_FLOOR.min(attribute.base_value));
                }
            }
        }

        let volatility = usable_factor(modifiers.volatility_factor);
        for facet in next.traits.values_mut() {
            facet.volatility *= volatility;
        }
        for facet in next.emotional_tendencies.values_mut() {
            facet.volatility *= volatility;
        }

        let adaptability = usable_factor(modifiers.adaptability_factor);
        for facet in next.cognitive_traits.values_mut() {
            facet.adaptability *= adaptability;
        }

        next
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use persona_types::{Attribute, CognitiveTrait, Trait};

    use super::*;

    const EPS: f64 = 1e-12;

    fn profile(wisdom: i32, strength: i32) -> PersonalityProfile {
        PersonalityProfile::builder()
            .attribute(Attribute::new("wisdom", "Wisdom", wisdom))
            .attribute(Attribute::new("strength", "Strength", strength))
            .attribute(Attribute::new("charisma", "Charisma", 14))
            .trait_facet(Trait::new("courage", "Courage", 0.5).with_volatility(1.0))
            .cognitive_trait(CognitiveTrait::new("logic", "Logic", 0.5).with_adaptability(1.0))
            .build()
            .unwrap()
    }

    #[test]
    fn table_bands() {
        assert_eq!(AgeModifiers::for_age(10).wisdom_bonus, 0);
        assert_eq!(AgeModifiers::for_age(20).wisdom_bonus, 1);
        assert_eq!(AgeModifiers::for_age(59).wisdom_bonus, 2);
        assert_eq!(AgeModifiers::for_age(39).physical_decline, 0);
        assert_eq!(AgeModifiers::for_age(74).physical_decline, 2);
        assert_eq!(AgeModifiers::for_age(90).physical_decline, 3);
        assert!((AgeModifiers::for_age(45).volatility_factor - 0.85).abs() < EPS);
        assert!((AgeModifiers::for_age(61).adaptability_factor - 0.75).abs() < EPS);
    }

    #[test]
    fn elder_profile_is_capped_and_floored() {
        let aged = profile(19, 4).with_age_modifiers(80, None);
        assert_eq!(aged.attribute("wisdom").unwrap().base_value, WISDOM_CAP);
        assert_eq!(aged.attribute("strength").unwrap().base_value, PHYSICAL_FLOOR);
        assert_eq!(aged.attribute("charisma").unwrap().base_value, 14);
        assert!((aged.trait_facet("courage").unwrap().volatility - 0.7).abs() < EPS);
        assert!((aged.cognitive_trait("logic").unwrap().adaptability - 0.75).abs() < EPS);
    }

    #[test]
    fn overrides_replace_table_values() {
        let overrides = AgeModifierOverrides {
            wisdom_bonus: Some(0),
            volatility_factor: Some(0.5),
            ..AgeModifierOverrides::default()
        };
        let aged = profile(12, 12).with_age_modifiers(65, Some(&overrides));
        assert_eq!(aged.attribute("wisdom").unwrap().base_value, 12);
        assert_eq!(aged.attribute("strength").unwrap().base_value, 10);
        assert!((aged.trait_facet("courage").unwrap().volatility - 0.5).abs() < EPS);
    }

    #[test]
    fn young_adult_profile_is_unchanged_apart_from_wisdom() {
        let before = profile(10, 10);
        let aged = before.with_age_modifiers(25, None);
        assert_eq!(aged.attribute("wisdom").unwrap().base_value, 11);
        assert_eq!(aged.trait_facet("courage").unwrap(), before.trait_facet("courage").unwrap());
    }
}
