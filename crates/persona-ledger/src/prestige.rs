//! Prestige: renown along independent tracks that fades without upkeep.

use crate::catalog::{CatalogBuilder, DimensionCatalog, DimensionDefinition, Subrange};
use crate::kinds::{LevelInfo, Track};
use crate::{ConfigurationError, LedgerError, Prestige};

/// `(name, min, max, description, privileges)` for each default level.
const DEFAULT_LEVELS: [(&str, f64, f64, &str, &[&str]); 5] = [
    ("Unknown", 0.0, 99.0, "A face in the crowd", &[]),
    ("Recognized", 100.0, 249.0, "Names are starting to stick", &["audience"]),
    (
        "Respected",
        250.0,
        499.0,
        "Heard out when speaking",
        &["audience", "patronage"],
    ),
    (
        "Renowned",
        500.0,
        799.0,
        "Sought out by others",
        &["audience", "patronage", "retinue"],
    ),
    (
        "Legendary",
        800.0,
        1000.0,
        "Subject of songs",
        &["audience", "patronage", "retinue", "title"],
    ),
];

/// The built-in tracks: `martial`, `scholarly`, and `courtly`, each ranging
/// over `[0, 1000]` with default `0`.
///
/// # Errors
///
/// Returns [`ConfigurationError`] if the built-in definitions are invalid.
pub fn default_tracks() -> Result<DimensionCatalog<Track>, ConfigurationError> {
    CatalogBuilder::<Track>::new()
        .dimension(track("martial", "Martial", "Deeds of arms"))
        .dimension(track("scholarly", "Scholarly", "Learning and discovery"))
        .dimension(track("courtly", "Courtly", "Grace at court"))
        .build()
}

fn track(id: &str, name: &str, description: &str) -> DimensionDefinition<LevelInfo> {
    DEFAULT_LEVELS.iter().fold(
        DimensionDefinition::new(id, name, 0.0, 1000.0, 0.0).with_description(description),
        |def, (level, min, max, text, privileges)| {
            def.with_subrange(
                *level,
                *min,
                *max,
                LevelInfo {
                    description: (*text).to_owned(),
                    privileges: privileges.iter().map(|p| (*p).to_owned()).collect(),
                },
            )
        },
    )
}

impl Prestige {
    /// A ledger over [`default_tracks`] with every track at zero.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Configuration`] if the built-in catalog is
    /// invalid.
    pub fn with_default_tracks() -> Result<Self, LedgerError> {
        Ok(Self::new(default_tracks()?))
    }

    /// The level the track's current value falls in.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownDimension`] if `track` is not in the
    /// catalog.
    pub fn level(&self, track: &str) -> Result<Option<&Subrange<LevelInfo>>, LedgerError> {
        self.classify(track)
    }

    /// Sum of every track's current value.
    pub fn total(&self) -> f64 {
        self.values.values().sum()
    }
}
