//! Personality profiles and their builder.
//!
//! A [`PersonalityProfile`] holds four facet collections keyed by id. It is
//! an immutable value: evolution and age adjustments produce a new profile
//! and leave the original untouched.
//!
//! # JSON shape
//!
//! ```text
//! {
//!   "traits":              [ Trait, ... ],
//!   "attributes":          [ Attribute, ... ],
//!   "emotionalTendencies": [ EmotionalTendency, ... ],
//!   "cognitiveTraits":     [ CognitiveTrait, ... ]
//! }
//! ```
//!
//! Each list is ordered by id. Decoding runs the same validation as
//! [`ProfileBuilder::build`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use persona_types::{Attribute, CognitiveTrait, EmotionalTendency, FacetKind, Trait};

use crate::error::ProfileError;

// ---------------------------------------------------------------------------
// Facet validation
// ---------------------------------------------------------------------------

/// Common view over the four facet records.
trait Facet: Sized + for<'de> Deserialize<'de> {
    const KIND: FacetKind;

    fn id(&self) -> &str;

    /// Describe the first out-of-range field, if any.
    fn problem(&self) -> Option<String>;
}

fn unit_interval(field: &str, value: f64) -> Option<String> {
    (!(0.0..=1.0).contains(&value)).then(|| format!("{field} {value} is outside [0, 1]"))
}

fn non_negative(field: &str, value: f64) -> Option<String> {
    (!value.is_finite() || value < 0.0)
        .then(|| format!("{field} {value} must be finite and non-negative"))
}

impl Facet for Trait {
    const KIND: FacetKind = FacetKind::Trait;

    fn id(&self) -> &str {
        &self.id
    }

    fn problem(&self) -> Option<String> {
        unit_interval("intensity", self.intensity)
            .or_else(|| unit_interval("baseLevel", self.base_level))
            .or_else(|| non_negative("volatility", self.volatility))
    }
}

impl Facet for EmotionalTendency {
    const KIND: FacetKind = FacetKind::EmotionalTendency;

    fn id(&self) -> &str {
        &self.id
    }

    fn problem(&self) -> Option<String> {
        unit_interval("intensity", self.intensity)
            .or_else(|| unit_interval("baseLevel", self.base_level))
            .or_else(|| non_negative("volatility", self.volatility))
    }
}

impl Facet for Attribute {
    const KIND: FacetKind = FacetKind::Attribute;

    fn id(&self) -> &str {
        &self.id
    }

    fn problem(&self) -> Option<String> {
        None
    }
}

impl Facet for CognitiveTrait {
    const KIND: FacetKind = FacetKind::CognitiveTrait;

    fn id(&self) -> &str {
        &self.id
    }

    fn problem(&self) -> Option<String> {
        unit_interval("complexity", self.complexity)
            .or_else(|| non_negative("adaptability", self.adaptability))
    }
}

/// Validate each facet and key it by id, rejecting duplicates.
fn index_facets<F: Facet>(facets: Vec<F>) -> Result<BTreeMap<String, F>, ProfileError> {
    let mut indexed = BTreeMap::new();
    for facet in facets {
        if facet.id().is_empty() {
            return Err(ProfileError::InvalidFacet {
                kind: F::KIND,
                id: String::new(),
                reason: "id is empty".to_owned(),
            });
        }
        if let Some(reason) = facet.problem() {
            return Err(ProfileError::InvalidFacet {
                kind: F::KIND,
                id: facet.id().to_owned(),
                reason,
            });
        }
        let id = facet.id().to_owned();
        if indexed.contains_key(&id) {
            return Err(ProfileError::DuplicateFacet { kind: F::KIND, id });
        }
        indexed.insert(id, facet);
    }
    Ok(indexed)
}

fn parse_definition<F: Facet>(definition: &Value) -> Result<F, ProfileError> {
    serde_json::from_value(definition.clone()).map_err(|e| ProfileError::InvalidFacet {
        kind: F::KIND,
        id: definition
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned(),
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// PersonalityProfile
// ---------------------------------------------------------------------------

/// Four facet collections describing one character's personality.
///
/// Equality is structural over every facet, evolution notes included.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ProfileRecord", into = "ProfileRecord")]
pub struct PersonalityProfile {
    pub(crate) traits: BTreeMap<String, Trait>,
    pub(crate) attributes: BTreeMap<String, Attribute>,
    pub(crate) emotional_tendencies: BTreeMap<String, EmotionalTendency>,
    pub(crate) cognitive_traits: BTreeMap<String, CognitiveTrait>,
}

impl PersonalityProfile {
    /// Start building a profile.
    pub const fn builder() -> ProfileBuilder {
        ProfileBuilder::new()
    }

    /// Look up a trait.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::UnknownFacet`] if no trait has this id.
    pub fn trait_facet(&self, id: &str) -> Result<&Trait, ProfileError> {
        self.traits.get(id).ok_or_else(|| unknown(FacetKind::Trait, id))
    }

    /// Look up an attribute.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::UnknownFacet`] if no attribute has this id.
    pub fn attribute(&self, id: &str) -> Result<&Attribute, ProfileError> {
        self.attributes
            .get(id)
            .ok_or_else(|| unknown(FacetKind::Attribute, id))
    }

    /// Look up an emotional tendency.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::UnknownFacet`] if no tendency has this id.
    pub fn emotional_tendency(&self, id: &str) -> Result<&EmotionalTendency, ProfileError> {
        self.emotional_tendencies
            .get(id)
            .ok_or_else(|| unknown(FacetKind::EmotionalTendency, id))
    }

    /// Look up a cognitive trait.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::UnknownFacet`] if no cognitive trait has this id.
    pub fn cognitive_trait(&self, id: &str) -> Result<&CognitiveTrait, ProfileError> {
        self.cognitive_traits
            .get(id)
            .ok_or_else(|| unknown(FacetKind::CognitiveTrait, id))
    }

    /// All traits, ordered by id.
    pub fn traits(&self) -> impl Iterator<Item = &Trait> {
        self.traits.values()
    }

    /// All attributes, ordered by id.
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.values()
    }

    /// All emotional tendencies, ordered by id.
    pub fn emotional_tendencies(&self) -> impl Iterator<Item = &EmotionalTendency> {
        self.emotional_tendencies.values()
    }

    /// All cognitive traits, ordered by id.
    pub fn cognitive_traits(&self) -> impl Iterator<Item = &CognitiveTrait> {
        self.cognitive_traits.values()
    }

    /// Number of facets in one collection.
    pub fn count(&self, kind: FacetKind) -> usize {
        match kind {
            FacetKind::Trait => self.traits.len(),
            FacetKind::Attribute => self.attributes.len(),
            FacetKind::EmotionalTendency => self.emotional_tendencies.len(),
            FacetKind::CognitiveTrait => self.cognitive_traits.len(),
        }
    }

    /// Whether all four collections are empty.
    pub fn is_empty(&self) -> bool {
        FacetKind::ALL.into_iter().all(|k| self.count(k) == 0)
    }

    // -----------------------------------------------------------------------
    // JSON
    // -----------------------------------------------------------------------

    /// Encode the profile as a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Serialization`] on encoding failure.
    pub fn to_json(&self) -> Result<Value, ProfileError> {
        serde_json::to_value(self).map_err(|e| ProfileError::Serialization {
            reason: e.to_string(),
        })
    }

    /// Encode the profile as a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Serialization`] on encoding failure.
    pub fn to_json_string(&self) -> Result<String, ProfileError> {
        serde_json::to_string(self).map_err(|e| ProfileError::Serialization {
            reason: e.to_string(),
        })
    }

    /// Decode a profile snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Deserialization`] for non-object input,
    /// malformed facets, duplicate ids, or out-of-range scores.
    pub fn from_json(snapshot: &Value) -> Result<Self, ProfileError> {
        if !snapshot.is_object() {
            return Err(ProfileError::Deserialization {
                reason: "snapshot is not a JSON object".to_owned(),
            });
        }
        Self::deserialize(snapshot).map_err(|e| ProfileError::Deserialization {
            reason: e.to_string(),
        })
    }

    /// Decode a profile snapshot from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Deserialization`] if the text is not JSON or
    /// the snapshot is invalid.
    pub fn from_json_str(text: &str) -> Result<Self, ProfileError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| ProfileError::Deserialization {
                reason: e.to_string(),
            })?;
        Self::from_json(&value)
    }
}

fn unknown(kind: FacetKind, id: &str) -> ProfileError {
    ProfileError::UnknownFacet {
        kind,
        id: id.to_owned(),
    }
}

/// Wire form of a profile: one id-ordered list per kind.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileRecord {
    #[serde(default)]
    traits: Vec<Trait>,
    #[serde(default)]
    attributes: Vec<Attribute>,
    #[serde(default)]
    emotional_tendencies: Vec<EmotionalTendency>,
    #[serde(default)]
    cognitive_traits: Vec<CognitiveTrait>,
}

impl From<PersonalityProfile> for ProfileRecord {
    fn from(profile: PersonalityProfile) -> Self {
        Self {
            traits: profile.traits.into_values().collect(),
            attributes: profile.attributes.into_values().collect(),
            emotional_tendencies: profile.emotional_tendencies.into_values().collect(),
            cognitive_traits: profile.cognitive_traits.into_values().collect(),
        }
    }
}

impl TryFrom<ProfileRecord> for PersonalityProfile {
    type Error = ProfileError;

    fn try_from(record: ProfileRecord) -> Result<Self, Self::Error> {
        ProfileBuilder {
            traits: record.traits,
            attributes: record.attributes,
            emotional_tendencies: record.emotional_tendencies,
            cognitive_traits: record.cognitive_traits,
        }
        .build()
    }
}

// ---------------------------------------------------------------------------
// ProfileBuilder
// ---------------------------------------------------------------------------

/// Collects facets and validates them into a [`PersonalityProfile`].
///
/// ```
/// use persona_traits::PersonalityProfile;
/// use persona_types::{Attribute, Trait};
///
/// let profile = PersonalityProfile::builder()
///     .trait_facet(Trait::new("courage", "Courage", 0.6))
///     .attribute(Attribute::new("wisdom", "Wisdom", 12))
///     .build();
///
/// assert!(profile.is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProfileBuilder {
    traits: Vec<Trait>,
    attributes: Vec<Attribute>,
    emotional_tendencies: Vec<EmotionalTendency>,
    cognitive_traits: Vec<CognitiveTrait>,
}

impl ProfileBuilder {
    /// Start an empty builder.
    pub const fn new() -> Self {
        Self {
            traits: Vec::new(),
            attributes: Vec::new(),
            emotional_tendencies: Vec::new(),
            cognitive_traits: Vec::new(),
        }
    }

    /// Parse a flat list of definitions, each tagged with a `kind` of
    /// `trait`, `attribute`, `emotionalTendency`, or `cognitiveTrait`.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::MissingFacetKind`],
    /// [`ProfileError::UnknownFacetKind`], or [`ProfileError::InvalidFacet`]
    /// for the first definition that cannot be parsed.
    pub fn from_definitions(definitions: &[Value]) -> Result<Self, ProfileError> {
        definitions
            .iter()
            .enumerate()
            .try_fold(Self::new(), |builder, (index, definition)| {
                let tag = definition
                    .get("kind")
                    .and_then(Value::as_str)
                    .ok_or(ProfileError::MissingFacetKind { index })?;
                let kind = FacetKind::parse(tag).ok_or_else(|| ProfileError::UnknownFacetKind {
                    tag: tag.to_owned(),
                })?;
                Ok(match kind {
                    FacetKind::Trait => builder.trait_facet(parse_definition(definition)?),
                    FacetKind::Attribute => builder.attribute(parse_definition(definition)?),
                    FacetKind::EmotionalTendency => {
                        builder.emotional_tendency(parse_definition(definition)?)
                    }
                    FacetKind::CognitiveTrait => {
                        builder.cognitive_trait(parse_definition(definition)?)
                    }
                })
            })
    }

    /// Add a trait.
    #[must_use]
    pub fn trait_facet(mut self, facet: Trait) -> Self {
        self.traits.push(facet);
        self
    }

    /// Add an attribute.
    #[must_use]
    pub fn attribute(mut self, facet: Attribute) -> Self {
        self.attributes.push(facet);
        self
    }

    /// Add an emotional tendency.
    #[must_use]
    pub fn emotional_tendency(mut self, facet: EmotionalTendency) -> Self {
        self.emotional_tendencies.push(facet);
        self
    }

    /// Add a cognitive trait.
    #[must_use]
    pub fn cognitive_trait(mut self, facet: CognitiveTrait) -> Self {
        self.cognitive_traits.push(facet);
        self
    }

    /// Validate every facet and produce the profile.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::DuplicateFacet`] if two facets of one kind
    /// share an id, or [`ProfileError::InvalidFacet`] for an empty id or an
    /// out-of-range score.
    pub fn build(self) -> Result<PersonalityProfile, ProfileError> {
        Ok(PersonalityProfile {
            traits: index_facets(self.traits)?,
            attributes: index_facets(self.attributes)?,
            emotional_tendencies: index_facets(self.emotional_tendencies)?,
            cognitive_traits: index_facets(self.cognitive_traits)?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample() -> PersonalityProfile {
        PersonalityProfile::builder()
            .trait_facet(Trait::new("courage", "Courage", 0.6))
            .trait_facet(Trait::new("empathy", "Empathy", 0.4))
            .attribute(Attribute::new("wisdom", "Wisdom", 13))
            .emotional_tendency(EmotionalTendency::new("anxiety", "Anxiety", 0.3))
            .cognitive_trait(CognitiveTrait::new("analytical", "Analytical", 0.5))
            .build()
            .unwrap()
    }

    #[test]
    fn duplicate_ids_rejected_per_kind() {
        let result = PersonalityProfile::builder()
            .trait_facet(Trait::new("calm", "Calm", 0.5))
            .trait_facet(Trait::new("calm", "Calm again", 0.2))
            .build();
        assert_eq!(
            result.err(),
            Some(ProfileError::DuplicateFacet {
                kind: FacetKind::Trait,
                id: "calm".to_owned(),
            })
        );

        // Same id in different kinds is fine.
        let mixed = PersonalityProfile::builder()
            .trait_facet(Trait::new("calm", "Calm", 0.5))
            .emotional_tendency(EmotionalTendency::new("calm", "Calm", 0.5))
            .build();
        assert!(mixed.is_ok());
    }

    #[test]
    fn out_of_range_scores_rejected() {
        let result = PersonalityProfile::builder()
            .trait_facet(Trait::new("zeal", "Zeal", 1.5))
            .build();
        assert!(matches!(
            result,
            Err(ProfileError::InvalidFacet { kind: FacetKind::Trait, .. })
        ));

        let result = PersonalityProfile::builder()
            .cognitive_trait(CognitiveTrait::new("logic", "Logic", 0.5).with_adaptability(-1.0))
            .build();
        assert!(matches!(
            result,
            Err(ProfileError::InvalidFacet { kind: FacetKind::CognitiveTrait, .. })
        ));
    }

    #[test]
    fn definitions_dispatch_on_kind_tag() {
        let definitions = vec![
            json!({"kind": "trait", "id": "courage", "name": "Courage", "intensity": 0.7, "baseLevel": 0.6}),
            json!({"kind": "attribute", "id": "strength", "name": "Strength", "baseValue": 15}),
            json!({"kind": "cognitiveTrait", "id": "logic", "name": "Logic", "complexity": 0.4}),
        ];
        let profile = ProfileBuilder::from_definitions(&definitions)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(profile.attribute("strength").unwrap().modifier(), 2);
        assert!((profile.trait_facet("courage").unwrap().volatility - 0.5).abs() < f64::EPSILON);
        assert_eq!(profile.count(FacetKind::EmotionalTendency), 0);
    }

    #[test]
    fn definitions_report_bad_tags() {
        let unknown_kind = vec![json!({"kind": "aura", "id": "x", "name": "X"})];
        assert_eq!(
            ProfileBuilder::from_definitions(&unknown_kind).err(),
            Some(ProfileError::UnknownFacetKind {
                tag: "aura".to_owned()
            })
        );

        let missing = vec![json!({"id": "x"})];
        assert_eq!(
            ProfileBuilder::from_definitions(&missing).err(),
            Some(ProfileError::MissingFacetKind { index: 0 })
        );

        let malformed = vec![json!({"kind": "trait", "id": "x", "name": "X"})];
        assert!(matches!(
            ProfileBuilder::from_definitions(&malformed),
            Err(ProfileError::InvalidFacet { .. })
        ));
    }

    #[test]
    fn unknown_facet_lookup() {
        let profile = sample();
        assert_eq!(
            profile.cognitive_trait("intuition").err(),
            Some(ProfileError::UnknownFacet {
                kind: FacetKind::CognitiveTrait,
                id: "intuition".to_owned(),
            })
        );
    }

    #[test]
    fn json_lists_are_id_ordered() {
        let encoded = sample().to_json().unwrap();
        let ids: Vec<&str> = encoded["traits"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|t| t["id"].as_str())
            .collect();
        assert_eq!(ids, vec!["courage", "empathy"]);
        assert_eq!(encoded["attributes"][0]["modifier"], json!(1));
        assert!(encoded.get("emotionalTendencies").is_some());
        assert!(encoded.get("cognitiveTraits").is_some());
    }

    #[test]
    fn json_rejects_duplicates_and_non_objects() {
        let duplicated = json!({
            "traits": [
                {"id": "a", "name": "A", "intensity": 0.1, "baseLevel": 0.1},
                {"id": "a", "name": "A", "intensity": 0.2, "baseLevel": 0.2}
            ]
        });
        assert!(matches!(
            PersonalityProfile::from_json(&duplicated),
            Err(ProfileError::Deserialization { .. })
        ));
        assert!(PersonalityProfile::from_json(&json!([])).is_err());
    }
}
