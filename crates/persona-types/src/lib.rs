//! Shared value types for the Persona character-attribute ledgers.
//!
//! This crate holds the records that cross crate boundaries and end up in
//! persisted JSON snapshots. Types that editors read directly are exported
//! to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`context`] -- Map-aware context payloads for change records
//! - [`record`] -- The append-only [`ChangeRecord`]
//! - [`facets`] -- Personality facet records

pub mod context;
pub mod facets;
pub mod record;

// Re-export all public types at crate root for convenience.
pub use context::{AssocMap, ChangeContext, ContextError, ContextField};
pub use facets::{
    Attribute, AttributeRecord, CognitiveTrait, DEFAULT_ADAPTABILITY, DEFAULT_VOLATILITY,
    EmotionalTendency, EvolutionNote, FacetKind, Trait,
};
pub use record::ChangeRecord;
