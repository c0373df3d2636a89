//! Error types for the persona-traits crate.
//!
//! Profile construction and decoding fail fast with a typed error. Event
//! evolution never fails: unknown categories degrade to a no-op.

use persona_types::FacetKind;

/// Errors that can occur while building, reading, or decoding a profile.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfileError {
    /// Two facets of the same kind share an id.
    #[error("duplicate {kind} id: `{id}`")]
    DuplicateFacet {
        /// The collection the duplicate was found in.
        kind: FacetKind,
        /// The repeated id.
        id: String,
    },

    /// A facet definition carries an unrecognised `kind` tag.
    #[error("unknown facet kind: `{tag}`")]
    UnknownFacetKind {
        /// The tag as written in the definition.
        tag: String,
    },

    /// No facet with this id exists in the requested collection.
    #[error("unknown {kind}: `{id}`")]
    UnknownFacet {
        /// The collection that was searched.
        kind: FacetKind,
        /// The id that was looked up.
        id: String,
    },

    /// A facet definition is malformed or has an out-of-range score.
    #[error("invalid {kind} `{id}`: {reason}")]
    InvalidFacet {
        /// The collection the facet belongs to.
        kind: FacetKind,
        /// The facet id, or empty if the id itself is missing.
        id: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A definition has no usable `kind` tag.
    #[error("facet definition #{index} has no `kind` tag")]
    MissingFacetKind {
        /// Position of the definition in the input list.
        index: usize,
    },

    /// A profile could not be encoded to JSON.
    #[error("cannot serialize profile snapshot: {reason}")]
    Serialization {
        /// Underlying serializer message.
        reason: String,
    },

    /// A persisted profile snapshot is malformed.
    #[error("cannot deserialize profile snapshot: {reason}")]
    Deserialization {
        /// What was wrong with the input.
        reason: String,
    },
}
