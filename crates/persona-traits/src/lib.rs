//! Personality profiles and the rule-driven trait evolution engine.
//!
//! A [`PersonalityProfile`] holds four facet collections (traits,
//! attributes, emotional tendencies, cognitive traits). Events such as
//! experiences or traumas are turned into bounded facet changes by the
//! [`TraitEvolutionEngine`], which reads its deltas from a [`RuleSet`].
//! Every operation returns a new profile.
//!
//! # Modules
//!
//! - [`profile`] -- [`PersonalityProfile`], [`ProfileBuilder`], and the JSON codec
//! - [`events`] -- Event payloads ([`Experience`], [`HistoricalEvent`], [`Trauma`], [`SocialInteraction`])
//! - [`rules`] -- Built-in category tables and the deserializable [`RuleSet`]
//! - [`engine`] -- [`TraitEvolutionEngine`] and the evolution pipeline
//! - [`age`] -- Age modifiers ([`AgeModifiers`], [`AgeModifierOverrides`])
//! - [`error`] -- Error types ([`ProfileError`])
//!
//! # Usage
//!
//! ```
//! use persona_traits::{Experience, PersonalityProfile};
//! use persona_types::Trait;
//!
//! let profile = PersonalityProfile::builder()
//!     .trait_facet(Trait::new("courage", "Courage", 0.5))
//!     .build();
//!
//! let evolved = profile
//!     .as_ref()
//!     .map(|p| p.with_experience_influence(&Experience::new("combat").with_intensity(1.0)));
//! let courage = evolved
//!     .as_ref()
//!     .ok()
//!     .and_then(|p| p.trait_facet("courage").ok())
//!     .map(|t| t.intensity);
//! assert!(courage.is_some_and(|c| c > 0.5));
//! ```

pub mod age;
pub mod engine;
pub mod error;
pub mod events;
pub mod profile;
pub mod rules;

// Re-export primary types at crate root for convenience.
pub use age::{AgeModifierOverrides, AgeModifiers, PHYSICAL_FLOOR, WISDOM_CAP};
pub use engine::{LifeEvent, TraitEvolutionEngine};
pub use error::ProfileError;
pub use events::{
    CulturalInfluence, EventScale, Experience, HistoricalEvent, RoleImportance, SocialInteraction,
    Trauma,
};
pub use profile::{PersonalityProfile, ProfileBuilder};
pub use rules::{FacetEffects, RuleSet};
