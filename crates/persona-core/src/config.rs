//! Configuration loading and typed config structures.
//!
//! The configuration lives in a single YAML file, conventionally
//! `persona-config.yaml`. Every section is optional; an empty file yields
//! the built-in catalogs, the standard rule tables, and `info` logging.
//!
//! ```yaml
//! influence:
//!   domains:
//!     - id: trade
//!       name: Trade
//!       min: 0.0
//!       max: 50.0
//!       defaultValue: 5.0
//!       tiers:
//!         - { name: Minor, min: 0.0, max: 24.0 }
//!         - { name: Major, min: 25.0, max: 50.0 }
//! prestige:
//!   decay:
//!     martial: 2.0
//! logging:
//!   level: debug
//! ```
//!
//! Catalogs and decay rates are validated when the file is loaded, so a
//! `PersonaConfig` that exists always produces valid ledgers.

use std::collections::BTreeMap;
use std::path::Path;

use persona_ledger::{
    Alignment, Axis, ConfigurationError, DimensionCatalog, DimensionKind, Domain, Influence,
    KindDefinition, Prestige, Track, alignment, influence, prestige,
};
use persona_traits::{RuleSet, TraitEvolutionEngine};
use serde::Deserialize;
use tracing::warn;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A catalog template broke one or more catalog rules.
    #[error(transparent)]
    Catalog(#[from] ConfigurationError),

    /// A prestige decay rate was negative or not finite.
    #[error("decay rate {rate} for track `{track}` must be finite and non-negative")]
    InvalidDecayRate {
        /// The track the rate was given for.
        track: String,
        /// The rejected rate.
        rate: f64,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PersonaConfig {
    /// Influence domain templates.
    #[serde(default)]
    pub influence: InfluenceConfig,

    /// Prestige track templates and decay schedule.
    #[serde(default)]
    pub prestige: PrestigeConfig,

    /// Alignment axis templates.
    #[serde(default)]
    pub alignment: AlignmentConfig,

    /// Replacement evolution tables. `None` keeps the standard tables.
    #[serde(default)]
    pub rules: Option<RuleSet>,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PersonaConfig {
    /// Load and validate configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, and
    /// [`ConfigError::Catalog`] or [`ConfigError::InvalidDecayRate`] if the
    /// content describes invalid catalogs or decay rates.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// See [`from_file`](Self::from_file).
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes as unit, not as an empty mapping.
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every section that can be invalid.
    ///
    /// # Errors
    ///
    /// Returns the first invalid catalog or decay rate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.influence_catalog()?;
        self.alignment_catalog()?;
        let tracks = self.prestige_catalog()?;

        for (track, &rate) in &self.prestige.decay {
            if !rate.is_finite() || rate < 0.0 {
                return Err(ConfigError::InvalidDecayRate {
                    track: track.clone(),
                    rate,
                });
            }
            if !tracks.contains(track) {
                warn!(track = %track, "decay rate configured for unknown track");
            }
        }
        Ok(())
    }

    /// The influence catalog: the configured domains, or the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] if the configured domains are invalid.
    pub fn influence_catalog(&self) -> Result<DimensionCatalog<Domain>, ConfigurationError> {
        catalog_or(&self.influence.domains, influence::default_domains)
    }

    /// The prestige catalog: the configured tracks, or the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] if the configured tracks are invalid.
    pub fn prestige_catalog(&self) -> Result<DimensionCatalog<Track>, ConfigurationError> {
        catalog_or(&self.prestige.tracks, prestige::default_tracks)
    }

    /// The alignment catalog: the configured axes, or the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] if the configured axes are invalid.
    pub fn alignment_catalog(&self) -> Result<DimensionCatalog<Axis>, ConfigurationError> {
        catalog_or(&self.alignment.axes, alignment::default_axes)
    }

    /// A fresh influence ledger at the catalog defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] if the configured domains are invalid.
    pub fn influence(&self) -> Result<Influence, ConfigurationError> {
        self.influence_catalog().map(Influence::new)
    }

    /// A fresh prestige ledger at the catalog defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] if the configured tracks are invalid.
    pub fn prestige(&self) -> Result<Prestige, ConfigurationError> {
        self.prestige_catalog().map(Prestige::new)
    }

    /// A fresh alignment ledger at the catalog defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] if the configured axes are invalid.
    pub fn alignment(&self) -> Result<Alignment, ConfigurationError> {
        self.alignment_catalog().map(Alignment::new)
    }

    /// The configured decay schedule, ready for `Prestige::with_decay`.
    pub fn decay_rates(&self) -> impl Iterator<Item = (&str, f64)> {
        self.prestige
            .decay
            .iter()
            .map(|(track, &rate)| (track.as_str(), rate))
    }

    /// An evolution engine over the configured tables, or the standard ones.
    pub fn evolution_engine(&self) -> TraitEvolutionEngine {
        self.rules
            .clone()
            .map_or_else(TraitEvolutionEngine::standard, TraitEvolutionEngine::new)
    }
}

fn catalog_or<K: DimensionKind>(
    templates: &[KindDefinition<K>],
    defaults: fn() -> Result<DimensionCatalog<K>, ConfigurationError>,
) -> Result<DimensionCatalog<K>, ConfigurationError> {
    if templates.is_empty() {
        defaults()
    } else {
        DimensionCatalog::new(templates.iter().map(|t| t.0.clone()).collect())
    }
}

/// Influence section.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InfluenceConfig {
    /// Domain templates. Empty means the built-in domains.
    #[serde(default)]
    pub domains: Vec<KindDefinition<Domain>>,
}

/// Prestige section.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PrestigeConfig {
    /// Track templates. Empty means the built-in tracks.
    #[serde(default)]
    pub tracks: Vec<KindDefinition<Track>>,

    /// Amount each track loses per decay step.
    #[serde(default)]
    pub decay: BTreeMap<String, f64>,
}

/// Alignment section.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AlignmentConfig {
    /// Axis templates. Empty means the built-in axes.
    #[serde(default)]
    pub axes: Vec<KindDefinition<Axis>>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error), used when `RUST_LOG` is
    /// not set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use persona_ledger::CatalogViolation;
    use persona_traits::Experience;

    use super::*;

    #[test]
    fn empty_yaml_uses_defaults() {
        let config = PersonaConfig::parse("").unwrap();
        assert_eq!(config, PersonaConfig::default());
        assert_eq!(config.logging.level, "info");

        let ids: Vec<_> = config.influence_catalog().unwrap().ids().map(str::to_owned).collect();
        assert_eq!(ids, ["political", "economic", "social"]);
        assert_eq!(config.prestige_catalog().unwrap().len(), 3);
        assert_eq!(config.alignment_catalog().unwrap().len(), 2);
        assert_eq!(config.decay_rates().count(), 0);
    }

    #[test]
    fn parse_custom_catalogs() {
        let yaml = r#"
influence:
  domains:
    - id: trade
      name: Trade
      min: 0.0
      max: 50.0
      defaultValue: 5.0
      tiers:
        - { name: Minor, min: 0.0, max: 24.0, description: "A stall holder" }
        - { name: Major, min: 25.0, max: 50.0 }
prestige:
  tracks:
    - id: arcane
      name: Arcane
      min: 0.0
      max: 10.0
      defaultValue: 0.0
      levels:
        - name: Apprentice
          min: 0.0
          max: 10.0
          privileges: [library]
  decay:
    arcane: 0.5
logging:
  level: debug
"#;
        let config = PersonaConfig::parse(yaml).unwrap();
        assert_eq!(config.logging.level, "debug");

        let influence = config.influence().unwrap();
        assert!((influence.value("trade").unwrap() - 5.0).abs() < f64::EPSILON);
        let tier = influence.tier("trade").unwrap().unwrap();
        assert_eq!(tier.name, "Minor");
        assert_eq!(tier.meta.description, "A stall holder");

        let prestige = config.prestige().unwrap();
        let level = prestige.level("arcane").unwrap().unwrap();
        assert_eq!(level.meta.privileges, ["library"]);

        let decayed = prestige
            .with_change("arcane", 2.0, "study", None)
            .unwrap()
            .with_decay(config.decay_rates())
            .unwrap();
        assert!((decayed.value("arcane").unwrap() - 1.5).abs() < f64::EPSILON);

        // Sections left out keep the defaults.
        assert!(config.alignment().unwrap().zone("moral").is_ok());
    }

    #[test]
    fn invalid_catalog_is_rejected_on_load() {
        let yaml = r"
alignment:
  axes:
    - id: chaos
      name: Chaos
      min: 10.0
      max: -10.0
      defaultValue: 0.0
";
        let inner = match PersonaConfig::parse(yaml) {
            Err(ConfigError::Catalog(inner)) => inner,
            other => panic!("Expected Catalog error, got {other:?}"),
        };
        assert_eq!(inner.noun, "axis");
        assert!(inner.violations.iter().any(|v| matches!(v, CatalogViolation::InvalidRange { .. })));
        assert!(inner.violations.iter().any(|v| matches!(v, CatalogViolation::NoSubranges { .. })));
    }

    #[test]
    fn templates_use_the_kind_key() {
        let with = |key: &str| {
            format!(
                "influence:\n  domains:\n    - {{ id: trade, name: Trade, min: 0.0, max: 10.0, \
                 defaultValue: 0.0, {key}: [{{ name: All, min: 0.0, max: 10.0 }}] }}\n"
            )
        };
        assert!(PersonaConfig::parse(&with("tiers")).is_ok());

        let err = PersonaConfig::parse(&with("zones")).unwrap_err();
        assert!(matches!(err, ConfigError::Catalog(ref inner) if inner.noun == "domain"));

        let err = PersonaConfig::parse(&with("subranges")).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn negative_decay_rate_is_rejected() {
        let err = PersonaConfig::parse("prestige:\n  decay:\n    martial: -1.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDecayRate { ref track, .. } if track == "martial"));
    }

    #[test]
    fn malformed_yaml_is_a_yaml_error() {
        let err = PersonaConfig::parse("influence: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn rules_replace_the_standard_tables() {
        let yaml = r"
rules:
  experiences:
    meditation:
      traits:
        patience: 0.2
";
        let config = PersonaConfig::parse(yaml).unwrap();
        let engine = config.evolution_engine();
        assert!(engine.rules().experience("meditation").is_some());
        assert!(engine.rules().experience("combat").is_none());

        let standard = PersonaConfig::default().evolution_engine();
        assert!(standard.rules().experience("combat").is_some());
        assert!(standard.rules().experience("meditation").is_none());

        let profile = persona_traits::PersonalityProfile::builder()
            .trait_facet(persona_types::Trait::new("patience", "Patience", 0.5))
            .build()
            .unwrap();
        let evolved = engine.with_experience_influence(&profile, &Experience::new("meditation"));
        assert!(evolved.trait_facet("patience").unwrap().intensity > 0.5);
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("persona-config.yaml");
        if path.exists() {
            let config = PersonaConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "logging:\n  level: warn").unwrap();
        let config = PersonaConfig::from_file(file.path()).unwrap();
        assert_eq!(config.logging.level, "warn");

        let missing = file.path().with_extension("absent");
        assert!(matches!(
            PersonaConfig::from_file(&missing),
            Err(ConfigError::Io { .. })
        ));
    }
}
