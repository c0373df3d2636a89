//! Rule tables mapping event categories to base facet deltas.
//!
//! The built-in tables are constant data. [`RuleSet::standard`] loads them
//! into lookup maps; a [`RuleSet`] can also be deserialized from config to
//! replace them wholesale.
//!
//! Facet ids used by the built-in tables:
//!
//! - traits: `courage`, `empathy`, `curiosity`, `discipline`, `trust`,
//!   `ambition`, `patience`
//! - emotional tendencies: `anxiety`, `optimism`, `anger`, `melancholy`,
//!   `joy`, `fear`
//! - cognitive traits: `strategic_thinking`, `creativity`, `analytical`,
//!   `intuition`, `introspection`
//!
//! Profiles without a given facet simply ignore its row.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Table data
// ---------------------------------------------------------------------------

/// Facet group a table row targets.
#[derive(Debug, Clone, Copy)]
enum Group {
    Trait,
    Emotional,
    Cognitive,
}

use Group::{Cognitive as C, Emotional as E, Trait as T};

type Row = (Group, &'static str, f64);

#[rustfmt::skip]
const EXPERIENCES: &[(&str, &[Row])] = &[
    ("achievement", &[(T, "ambition", 0.08), (T, "discipline", 0.03), (E, "optimism", 0.08), (E, "joy", 0.05)]),
    ("betrayal", &[(T, "trust", -0.15), (T, "empathy", -0.03), (E, "anger", 0.1), (E, "anxiety", 0.05), (C, "intuition", 0.05)]),
    ("combat", &[(T, "courage", 0.1), (T, "empathy", -0.05), (E, "anxiety", 0.08), (E, "anger", 0.05), (C, "strategic_thinking", 0.05)]),
    ("leadership", &[(T, "ambition", 0.05), (T, "discipline", 0.05), (T, "courage", 0.03), (C, "strategic_thinking", 0.08)]),
    ("loss", &[(T, "empathy", 0.05), (T, "trust", -0.05), (E, "melancholy", 0.1), (E, "optimism", -0.08), (C, "introspection", 0.06)]),
    ("romance", &[(T, "empathy", 0.08), (T, "trust", 0.05), (E, "joy", 0.1), (E, "anxiety", 0.03)]),
    ("study", &[(T, "discipline", 0.08), (T, "curiosity", 0.05), (C, "analytical", 0.1), (C, "creativity", 0.03)]),
    ("travel", &[(T, "curiosity", 0.1), (T, "trust", 0.02), (E, "optimism", 0.05), (C, "creativity", 0.05)]),
];

#[rustfmt::skip]
const HISTORICAL_EVENTS: &[(&str, &[Row])] = &[
    ("coronation", &[(T, "trust", 0.04), (E, "joy", 0.05), (E, "optimism", 0.05)]),
    ("discovery", &[(T, "curiosity", 0.1), (E, "optimism", 0.06), (C, "creativity", 0.06), (C, "analytical", 0.05)]),
    ("famine", &[(T, "patience", 0.05), (E, "anxiety", 0.1), (E, "melancholy", 0.06), (C, "strategic_thinking", 0.03)]),
    ("plague", &[(T, "empathy", 0.06), (E, "fear", 0.12), (E, "melancholy", 0.08), (C, "analytical", 0.04)]),
    ("revolution", &[(T, "ambition", 0.06), (T, "trust", -0.04), (E, "optimism", 0.04), (E, "anxiety", 0.06), (C, "creativity", 0.04)]),
    ("war", &[(T, "courage", 0.08), (T, "trust", -0.06), (E, "fear", 0.1), (E, "anger", 0.05), (C, "strategic_thinking", 0.06)]),
];

#[rustfmt::skip]
const TRAUMAS: &[(&str, &[Row])] = &[
    ("abandonment", &[(T, "trust", -0.15), (E, "anxiety", 0.1), (E, "melancholy", 0.1), (C, "introspection", 0.05)]),
    ("captivity", &[(T, "patience", 0.08), (T, "trust", -0.08), (E, "fear", 0.1), (E, "anger", 0.08), (C, "strategic_thinking", 0.04)]),
    ("disaster", &[(T, "courage", -0.05), (E, "fear", 0.12), (E, "optimism", -0.1), (C, "analytical", 0.03)]),
    ("grief", &[(T, "empathy", 0.05), (E, "melancholy", 0.15), (E, "joy", -0.1), (C, "introspection", 0.08)]),
    ("violence", &[(T, "courage", -0.1), (T, "trust", -0.12), (E, "fear", 0.15), (E, "anxiety", 0.12), (C, "intuition", 0.05)]),
];

#[rustfmt::skip]
const SOCIAL_INTERACTIONS: &[(&str, &str, &[Row])] = &[
    ("celebration", "positive", &[(T, "trust", 0.03), (E, "joy", 0.08)]),
    ("conflict", "negative", &[(T, "trust", -0.08), (E, "anger", 0.08), (E, "fear", 0.04)]),
    ("conflict", "positive", &[(T, "courage", 0.05), (E, "optimism", 0.03)]),
    ("conversation", "negative", &[(T, "trust", -0.04), (E, "anger", 0.04)]),
    ("conversation", "positive", &[(T, "trust", 0.05), (T, "empathy", 0.03), (E, "joy", 0.04)]),
    ("mentorship", "negative", &[(T, "trust", -0.05), (E, "anxiety", 0.05)]),
    ("mentorship", "positive", &[(T, "discipline", 0.05), (T, "patience", 0.04), (C, "analytical", 0.04), (C, "creativity", 0.03)]),
    ("negotiation", "negative", &[(T, "patience", -0.03), (E, "anger", 0.05), (C, "strategic_thinking", 0.02)]),
    ("negotiation", "positive", &[(T, "trust", 0.03), (C, "strategic_thinking", 0.05)]),
];

#[rustfmt::skip]
const CULTURAL_VALUES: &[(&str, &[&str])] = &[
    ("collectivism", &["empathy", "trust"]),
    ("honor", &["courage", "discipline"]),
    ("individualism", &["ambition", "curiosity"]),
    ("mysticism", &["intuition", "creativity"]),
    ("scholarship", &["curiosity", "analytical"]),
    ("stoicism", &["patience", "discipline"]),
];

// ---------------------------------------------------------------------------
// FacetEffects
// ---------------------------------------------------------------------------

/// Base deltas for one event category, per facet group.
///
/// Attributes are never moved by events; only age modifiers touch them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FacetEffects {
    /// Trait id to base delta.
    pub traits: BTreeMap<String, f64>,
    /// Emotional tendency id to base delta.
    pub emotional_tendencies: BTreeMap<String, f64>,
    /// Cognitive trait id to base delta.
    pub cognitive_traits: BTreeMap<String, f64>,
}

impl FacetEffects {
    /// Whether no facet is affected.
    pub fn is_empty(&self) -> bool {
        self.traits.is_empty()
            && self.emotional_tendencies.is_empty()
            && self.cognitive_traits.is_empty()
    }

    /// Every delta multiplied by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        let scale = |m: &BTreeMap<String, f64>| -> BTreeMap<String, f64> {
            m.iter()
                .map(|(id, delta)| (id.clone(), delta * factor))
                .collect()
        };
        Self {
            traits: scale(&self.traits),
            emotional_tendencies: scale(&self.emotional_tendencies),
            cognitive_traits: scale(&self.cognitive_traits),
        }
    }

    fn from_rows(rows: &[Row]) -> Self {
        let mut effects = Self::default();
        for (group, id, delta) in rows {
            let target = match group {
                Group::Trait => &mut effects.traits,
                Group::Emotional => &mut effects.emotional_tendencies,
                Group::Cognitive => &mut effects.cognitive_traits,
            };
            target.insert((*id).to_owned(), *delta);
        }
        effects
    }
}

// ---------------------------------------------------------------------------
// RuleSet
// ---------------------------------------------------------------------------

/// Every lookup table the evolution engine consults.
///
/// Missing sections deserialize as empty tables, which turns the matching
/// events into no-ops.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuleSet {
    /// Experience category to effects.
    pub experiences: BTreeMap<String, FacetEffects>,
    /// Historical event category to effects.
    pub historical_events: BTreeMap<String, FacetEffects>,
    /// Trauma category to effects.
    pub traumas: BTreeMap<String, FacetEffects>,
    /// Interaction type to outcome to effects.
    pub social_interactions: BTreeMap<String, BTreeMap<String, FacetEffects>>,
    /// Cultural value to the facet ids it amplifies.
    pub cultural_values: BTreeMap<String, Vec<String>>,
}

impl RuleSet {
    /// The built-in tables.
    pub fn standard() -> Self {
        let category_table = |table: &[(&str, &[Row])]| -> BTreeMap<String, FacetEffects> {
            table
                .iter()
                .map(|(category, rows)| ((*category).to_owned(), FacetEffects::from_rows(rows)))
                .collect()
        };

        let mut social_interactions: BTreeMap<String, BTreeMap<String, FacetEffects>> =
            BTreeMap::new();
        for (kind, outcome, rows) in SOCIAL_INTERACTIONS {
            social_interactions
                .entry((*kind).to_owned())
                .or_default()
                .insert((*outcome).to_owned(), FacetEffects::from_rows(rows));
        }

        Self {
            experiences: category_table(EXPERIENCES),
            historical_events: category_table(HISTORICAL_EVENTS),
            traumas: category_table(TRAUMAS),
            social_interactions,
            cultural_values: CULTURAL_VALUES
                .iter()
                .map(|(value, ids)| {
                    (
                        (*value).to_owned(),
                        ids.iter().map(|id| (*id).to_owned()).collect(),
                    )
                })
                .collect(),
        }
    }

    /// Effects of an experience category.
    pub fn experience(&self, category: &str) -> Option<&FacetEffects> {
        self.experiences.get(category)
    }

    /// Effects of a historical event category.
    pub fn historical_event(&self, category: &str) -> Option<&FacetEffects> {
        self.historical_events.get(category)
    }

    /// Effects of a trauma category.
    pub fn trauma(&self, category: &str) -> Option<&FacetEffects> {
        self.traumas.get(category)
    }

    /// Effects of an interaction type with a given outcome.
    pub fn social_interaction(&self, interaction_type: &str, outcome: &str) -> Option<&FacetEffects> {
        self.social_interactions
            .get(interaction_type)
            .and_then(|outcomes| outcomes.get(outcome))
    }

    /// Facet ids amplified by a cultural value. Empty for unknown values.
    pub fn cultural_facets(&self, value: &str) -> &[String] {
        self.cultural_values
            .get(value)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
