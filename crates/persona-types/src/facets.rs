//! Personality facet records.
//!
//! A personality profile is made of four kinds of facet, each keyed by a
//! string id that is unique within its kind:
//!
//! - [`Trait`] -- enduring dispositions (`courage`, `empathy`, ...)
//! - [`Attribute`] -- ability scores on the classic 3-20 scale
//! - [`EmotionalTendency`] -- habitual emotional responses
//! - [`CognitiveTrait`] -- ways of thinking
//!
//! Facets are plain values. Evolution never edits a facet; it builds a new
//! one with struct update syntax and a fresh [`EvolutionNote`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Default volatility for traits and emotional tendencies.
pub const DEFAULT_VOLATILITY: f64 = 0.5;

/// Default adaptability for cognitive traits.
pub const DEFAULT_ADAPTABILITY: f64 = 0.5;

/// Attribute score that yields a modifier of zero.
const ATTRIBUTE_BASELINE: i32 = 10;

const fn default_volatility() -> f64 {
    DEFAULT_VOLATILITY
}

const fn default_adaptability() -> f64 {
    DEFAULT_ADAPTABILITY
}

// ---------------------------------------------------------------------------
// FacetKind
// ---------------------------------------------------------------------------

/// The four facet collections of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum FacetKind {
    /// A [`Trait`].
    Trait,
    /// An [`Attribute`].
    Attribute,
    /// An [`EmotionalTendency`].
    EmotionalTendency,
    /// A [`CognitiveTrait`].
    CognitiveTrait,
}

impl FacetKind {
    /// All kinds, in serialization order.
    pub const ALL: [Self; 4] = [
        Self::Trait,
        Self::Attribute,
        Self::EmotionalTendency,
        Self::CognitiveTrait,
    ];

    /// The `kind` tag used in facet definitions.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trait => "trait",
            Self::Attribute => "attribute",
            Self::EmotionalTendency => "emotionalTendency",
            Self::CognitiveTrait => "cognitiveTrait",
        }
    }

    /// The key of this kind's collection in a profile snapshot.
    pub const fn collection_key(self) -> &'static str {
        match self {
            Self::Trait => "traits",
            Self::Attribute => "attributes",
            Self::EmotionalTendency => "emotionalTendencies",
            Self::CognitiveTrait => "cognitiveTraits",
        }
    }

    /// Parse a definition `kind` tag.
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == tag)
    }
}

impl core::fmt::Display for FacetKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EvolutionNote
// ---------------------------------------------------------------------------

/// Audit note left on a facet each time an event moves it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct EvolutionNote {
    /// Which event caused the change (e.g. `"experience: combat"`).
    pub reason: String,
    /// The applied change before clamping.
    pub change: f64,
    /// When the change was applied.
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Trait / EmotionalTendency
// ---------------------------------------------------------------------------

/// Generates a facet with `intensity`, `base_level`, and `volatility`.
macro_rules! define_scalar_facet {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
        #[serde(rename_all = "camelCase")]
        #[ts(export, export_to = "bindings/")]
        pub struct $name {
            /// Identifier, unique within the collection.
            pub id: String,
            /// Display name.
            pub name: String,
            /// Free-form description.
            #[serde(default)]
            pub description: String,
            /// Current strength in `[0, 1]`.
            pub intensity: f64,
            /// Resting level in `[0, 1]`; drifts at a tenth of the intensity rate.
            pub base_level: f64,
            /// How strongly events move this facet.
            #[serde(default = "default_volatility")]
            pub volatility: f64,
            /// Evolution audit trail, oldest first.
            #[serde(default)]
            pub notes: Vec<EvolutionNote>,
        }

        impl $name {
            /// Create a facet whose base level starts at its intensity.
            pub fn new(id: impl Into<String>, name: impl Into<String>, intensity: f64) -> Self {
                Self {
                    id: id.into(),
                    name: name.into(),
                    description: String::new(),
                    intensity,
                    base_level: intensity,
                    volatility: DEFAULT_VOLATILITY,
                    notes: Vec::new(),
                }
            }

            /// Set the description.
            #[must_use]
            pub fn with_description(mut self, description: impl Into<String>) -> Self {
                self.description = description.into();
                self
            }

            /// Set the base level.
            #[must_use]
            pub const fn with_base_level(mut self, base_level: f64) -> Self {
                self.base_level = base_level;
                self
            }

            /// Set the volatility.
            #[must_use]
            pub const fn with_volatility(mut self, volatility: f64) -> Self {
                self.volatility = volatility;
                self
            }

            /// The most recent evolution note, if any.
            pub fn last_note(&self) -> Option<&EvolutionNote> {
                self.notes.last()
            }
        }
    };
}

define_scalar_facet! {
    /// An enduring personality trait.
    Trait
}

define_scalar_facet! {
    /// A habitual emotional response.
    EmotionalTendency
}

// ---------------------------------------------------------------------------
// Attribute
// ---------------------------------------------------------------------------

/// An ability score.
///
/// The modifier is derived from the score and never stored as input:
/// `floor((base_value - 10) / 2)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "AttributeRecord", into = "AttributeRecord")]
pub struct Attribute {
    /// Identifier, unique within the collection.
    pub id: String,
    /// Display name.
    pub name: String,
    /// The raw score.
    pub base_value: i32,
}

impl Attribute {
    /// Create an attribute.
    pub fn new(id: impl Into<String>, name: impl Into<String>, base_value: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            base_value,
        }
    }

    /// The derived modifier.
    pub const fn modifier(&self) -> i32 {
        self.base_value
            .saturating_sub(ATTRIBUTE_BASELINE)
            .div_euclid(2)
    }
}

/// Serialized shape of an [`Attribute`]; `modifier` is written for readers
/// and ignored on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct AttributeRecord {
    /// Identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// The raw score.
    pub base_value: i32,
    /// Derived modifier.
    #[serde(default)]
    pub modifier: i32,
}

impl From<AttributeRecord> for Attribute {
    fn from(record: AttributeRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            base_value: record.base_value,
        }
    }
}

impl From<Attribute> for AttributeRecord {
    fn from(attribute: Attribute) -> Self {
        let modifier = attribute.modifier();
        Self {
            id: attribute.id,
            name: attribute.name,
            base_value: attribute.base_value,
            modifier,
        }
    }
}

// ---------------------------------------------------------------------------
// CognitiveTrait
// ---------------------------------------------------------------------------

/// A way of thinking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct CognitiveTrait {
    /// Identifier, unique within the collection.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Sophistication in `[0, 1]`.
    pub complexity: f64,
    /// How strongly events move this trait.
    #[serde(default = "default_adaptability")]
    pub adaptability: f64,
    /// Evolution audit trail, oldest first.
    #[serde(default)]
    pub notes: Vec<EvolutionNote>,
}

impl CognitiveTrait {
    /// Create a cognitive trait with default adaptability.
    pub fn new(id: impl Into<String>, name: impl Into<String>, complexity: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            complexity,
            adaptability: DEFAULT_ADAPTABILITY,
            notes: Vec::new(),
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the adaptability.
    #[must_use]
    pub const fn with_adaptability(mut self, adaptability: f64) -> Self {
        self.adaptability = adaptability;
        self
    }

    /// The most recent evolution note, if any.
    pub fn last_note(&self) -> Option<&EvolutionNote> {
        self.notes.last()
    }
}
