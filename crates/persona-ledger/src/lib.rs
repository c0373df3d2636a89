//! Bounded dimension ledgers for the Persona character model.
//!
//! A ledger tracks a fixed set of numeric dimensions -- influence domains,
//! prestige tracks, or alignment axes -- each with a `[min, max]` range, an
//! ordered list of named subranges (tiers, levels, zones) and an
//! append-only change history.
//!
//! # Architecture
//!
//! - [`kinds`] -- The [`DimensionKind`] trait and the three kinds
//!   ([`Domain`], [`Track`], [`Axis`]) with their subrange metadata.
//! - [`catalog`] -- [`DimensionCatalog`] and the validating
//!   [`CatalogBuilder`].
//! - [`ledger`] -- The immutable [`Ledger`] snapshot and its operations.
//! - [`codec`] -- JSON snapshots and the legacy manager adapter.
//! - [`influence`], [`prestige`], [`alignment`] -- The three named
//!   configurations and their default catalogs.
//!
//! # Immutability
//!
//! Every operation that looks like a mutation returns a new snapshot. The
//! snapshot it was called on is left untouched, so readers holding an older
//! snapshot never observe a partial update.
//!
//! # Usage
//!
//! ```
//! use persona_ledger::Influence;
//!
//! let influence = Influence::with_default_domains().ok();
//! let after = influence
//!     .as_ref()
//!     .and_then(|i| i.with_change("political", 25.0, "victory", None).ok());
//!
//! let value = after.as_ref().and_then(|i| i.value("political").ok());
//! assert_eq!(value.map(|v| v.round()), Some(35.0));
//! let tier = after.as_ref().and_then(|i| i.tier("political").ok().flatten());
//! assert_eq!(tier.map(|t| t.name.as_str()), Some("Medium"));
//! ```

pub mod alignment;
pub mod catalog;
pub mod codec;
pub mod influence;
pub mod kinds;
pub mod ledger;
pub mod prestige;

// Re-export primary types at crate root.
pub use catalog::{CatalogBuilder, DimensionCatalog, DimensionDefinition, Subrange};
pub use codec::KindDefinition;
pub use kinds::{Axis, Decaying, DimensionKind, Domain, LevelInfo, TierInfo, Track, ZoneInfo};
pub use ledger::{DECAY_REASON, Ledger};

/// Influence over political, economic, and social domains.
pub type Influence = Ledger<Domain>;

/// Prestige along independent tracks, with time decay.
pub type Prestige = Ledger<Track>;

/// Moral and ethical alignment axes.
pub type Alignment = Ledger<Axis>;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// A single rule broken by a catalog definition list.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogViolation {
    /// The catalog has no dimensions.
    #[error("at least one dimension is required")]
    Empty,

    /// A dimension has an empty id.
    #[error("dimension #{index} has no id")]
    MissingId {
        /// Position of the definition in the input list.
        index: usize,
    },

    /// A dimension has an empty name.
    #[error("dimension `{id}` has no name")]
    MissingName {
        /// The dimension id.
        id: String,
    },

    /// Two dimensions share an id.
    #[error("dimension id `{id}` is defined more than once")]
    DuplicateId {
        /// The repeated id.
        id: String,
    },

    /// `min` is not strictly below `max`.
    #[error("dimension `{id}` has invalid range [{min}, {max}]")]
    InvalidRange {
        /// The dimension id.
        id: String,
        /// Declared minimum.
        min: f64,
        /// Declared maximum.
        max: f64,
    },

    /// The default value lies outside `[min, max]`.
    #[error("dimension `{id}` default {default_value} is outside [{min}, {max}]")]
    DefaultOutOfRange {
        /// The dimension id.
        id: String,
        /// Declared default.
        default_value: f64,
        /// Declared minimum.
        min: f64,
        /// Declared maximum.
        max: f64,
    },

    /// The dimension declares no subranges.
    #[error("dimension `{id}` has no {subrange_key}")]
    NoSubranges {
        /// The dimension id.
        id: String,
        /// `"tiers"`, `"levels"`, or `"zones"`.
        subrange_key: &'static str,
    },

    /// A subrange's `min` is not strictly below its `max`.
    #[error("dimension `{id}` subrange `{subrange}` has invalid range [{min}, {max}]")]
    InvalidSubrange {
        /// The dimension id.
        id: String,
        /// The subrange name.
        subrange: String,
        /// Declared minimum.
        min: f64,
        /// Declared maximum.
        max: f64,
    },
}

/// A catalog failed validation. Lists every violated rule, not just the
/// first one found.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid {noun} catalog: {}", join_violations(.violations))]
pub struct ConfigurationError {
    /// `"domain"`, `"track"`, or `"axis"`.
    pub noun: &'static str,
    /// Every rule the definitions broke, in discovery order.
    pub violations: Vec<CatalogViolation>,
}

fn join_violations(violations: &[CatalogViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors returned by ledger construction, operations, and decoding.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    /// The catalog definitions are invalid.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The id does not name a dimension in the catalog.
    #[error("unknown {noun}: `{id}`")]
    UnknownDimension {
        /// `"domain"`, `"track"`, or `"axis"`.
        noun: &'static str,
        /// The id that was looked up.
        id: String,
    },

    /// A decay amount was negative or not a finite number.
    #[error("invalid decay amount {amount} for `{id}`: must be finite and non-negative")]
    InvalidDecay {
        /// The dimension the amount was given for.
        id: String,
        /// The rejected amount.
        amount: f64,
    },

    /// A delta or initial value was NaN or infinite.
    #[error("{what} for `{id}` must be finite, got {value}")]
    NonFiniteNumber {
        /// The dimension id.
        id: String,
        /// `"delta"` or `"value"`.
        what: &'static str,
        /// The rejected number.
        value: f64,
    },

    /// A snapshot could not be encoded to JSON.
    #[error("cannot serialize {noun} snapshot: {reason}")]
    Serialization {
        /// `"domain"`, `"track"`, or `"axis"`.
        noun: &'static str,
        /// Underlying serializer message.
        reason: String,
    },

    /// A persisted snapshot is malformed.
    #[error("cannot deserialize {noun} snapshot: {reason}")]
    Deserialization {
        /// `"domain"`, `"track"`, or `"axis"`.
        noun: &'static str,
        /// What was wrong with the input.
        reason: String,
    },

    /// The legacy adapter was handed a null manager.
    #[error("legacy {noun} manager is missing")]
    MissingLegacyManager {
        /// `"domain"`, `"track"`, or `"axis"`.
        noun: &'static str,
    },
}
