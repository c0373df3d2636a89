//! Dimension kinds and their subrange metadata.
//!
//! The three ledgers share one engine and differ only in naming, in the
//! metadata attached to each subrange, and in whether decay is supported.
//! Each difference is carried at the type level by a zero-sized kind.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Static description of one family of dimensions.
pub trait DimensionKind:
    core::fmt::Debug + Clone + Copy + PartialEq + Default + Send + Sync + 'static
{
    /// Metadata carried by every subrange of this kind, flattened into the
    /// subrange's JSON object.
    type Meta: core::fmt::Debug
        + Clone
        + PartialEq
        + Default
        + Serialize
        + DeserializeOwned
        + Send
        + Sync;

    /// Singular name used in errors and logs (`"domain"`).
    const NOUN: &'static str;

    /// Snapshot key holding the definition list (`"domains"`).
    const COLLECTION_KEY: &'static str;

    /// Definition key holding the subrange list (`"tiers"`).
    const SUBRANGE_KEY: &'static str;

    /// Key holding current values in legacy manager objects
    /// (`"playerInfluence"`).
    const LEGACY_VALUES_KEY: &'static str;
}

/// Marker for kinds whose ledgers support [`with_decay`].
///
/// [`with_decay`]: crate::Ledger::with_decay
pub trait Decaying: DimensionKind {}

// ---------------------------------------------------------------------------
// Influence
// ---------------------------------------------------------------------------

/// Influence domains, classified into tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Domain;

/// Descriptive metadata of an influence tier.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierInfo {
    /// What holding this tier means in the world.
    #[serde(default)]
    pub description: String,
}

impl DimensionKind for Domain {
    type Meta = TierInfo;
    const NOUN: &'static str = "domain";
    const COLLECTION_KEY: &'static str = "domains";
    const SUBRANGE_KEY: &'static str = "tiers";
    const LEGACY_VALUES_KEY: &'static str = "playerInfluence";
}

// ---------------------------------------------------------------------------
// Prestige
// ---------------------------------------------------------------------------

/// Prestige tracks, classified into levels. Tracks decay over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Track;

/// Metadata of a prestige level.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelInfo {
    /// How others perceive someone at this level.
    #[serde(default)]
    pub description: String,
    /// Privileges unlocked at this level.
    #[serde(default)]
    pub privileges: Vec<String>,
}

impl DimensionKind for Track {
    type Meta = LevelInfo;
    const NOUN: &'static str = "track";
    const COLLECTION_KEY: &'static str = "tracks";
    const SUBRANGE_KEY: &'static str = "levels";
    const LEGACY_VALUES_KEY: &'static str = "playerPrestige";
}

impl Decaying for Track {}

// ---------------------------------------------------------------------------
// Alignment
// ---------------------------------------------------------------------------

/// Alignment axes, classified into zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Axis;

/// Metadata of an alignment zone.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneInfo {
    /// What the zone represents.
    #[serde(default)]
    pub description: String,
    /// Gameplay effects active while the value sits in this zone.
    #[serde(default)]
    pub effects: Vec<String>,
}

impl DimensionKind for Axis {
    type Meta = ZoneInfo;
    const NOUN: &'static str = "axis";
    const COLLECTION_KEY: &'static str = "axes";
    const SUBRANGE_KEY: &'static str = "zones";
    const LEGACY_VALUES_KEY: &'static str = "playerAlignment";
}
