//! Offline inspector for Persona snapshots.
//!
//! Loads a YAML configuration and, optionally, a JSON snapshot, then prints
//! the current value and classification of every dimension, or every facet
//! of a personality profile.
//!
//! ```text
//! persona-inspect influence snapshot.json
//! persona-inspect prestige --decay --config persona-config.yaml
//! persona-inspect profile hero.json
//! ```
//!
//! Without a snapshot, ledgers start fresh from the configured catalogs.
//! Logging goes to stderr; `RUST_LOG` overrides the configured level.

mod error;

use std::path::{Path, PathBuf};

use persona_core::PersonaConfig;
use persona_ledger::{DimensionKind, Ledger};
use persona_traits::PersonalityProfile;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::InspectError;

/// Config file read when `--config` is not given, if present.
const DEFAULT_CONFIG: &str = "persona-config.yaml";

pub(crate) const USAGE: &str = "usage: persona-inspect <influence|prestige|alignment|profile> \
[SNAPSHOT] [--config FILE] [--decay]";

/// What to inspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Influence,
    Prestige,
    Alignment,
    Profile,
}

/// Parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Args {
    target: Target,
    snapshot: Option<PathBuf>,
    config: Option<PathBuf>,
    decay: bool,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, InspectError> {
        let usage = |message: String| InspectError::Usage { message };

        let mut args = args.into_iter();
        let target = match args.next().as_deref() {
            Some("influence") => Target::Influence,
            Some("prestige") => Target::Prestige,
            Some("alignment") => Target::Alignment,
            Some("profile") => Target::Profile,
            Some(other) => return Err(usage(format!("unknown target `{other}`"))),
            None => return Err(usage("missing target".to_owned())),
        };

        let mut parsed = Self {
            target,
            snapshot: None,
            config: None,
            decay: false,
        };
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    let path = args
                        .next()
                        .ok_or_else(|| usage("--config needs a file".to_owned()))?;
                    parsed.config = Some(PathBuf::from(path));
                }
                "--decay" => parsed.decay = true,
                flag if flag.starts_with("--") => {
                    return Err(usage(format!("unknown option `{flag}`")));
                }
                _ if parsed.snapshot.is_some() => {
                    return Err(usage(format!("unexpected argument `{arg}`")));
                }
                _ => parsed.snapshot = Some(PathBuf::from(arg)),
            }
        }

        if parsed.decay && parsed.target != Target::Prestige {
            return Err(usage("--decay only applies to prestige".to_owned()));
        }
        if parsed.target == Target::Profile && parsed.snapshot.is_none() {
            return Err(usage("profile needs a snapshot file".to_owned()));
        }
        Ok(parsed)
    }
}

fn main() -> Result<(), InspectError> {
    let args = Args::parse(std::env::args().skip(1))?;
    let config = load_config(args.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!(target_kind = ?args.target, snapshot = ?args.snapshot, "persona-inspect starting");

    let snapshot = args
        .snapshot
        .as_deref()
        .map(std::fs::read_to_string)
        .transpose()?;

    let report = match args.target {
        Target::Influence => {
            let ledger = match &snapshot {
                Some(text) => Ledger::from_json_str(text)?,
                None => config.influence()?,
            };
            render_ledger(&ledger)
        }
        Target::Prestige => {
            let mut ledger = match &snapshot {
                Some(text) => Ledger::from_json_str(text)?,
                None => config.prestige()?,
            };
            if args.decay {
                ledger = ledger.with_decay(config.decay_rates())?;
                info!(total = ledger.total(), "decay applied");
            }
            render_ledger(&ledger)
        }
        Target::Alignment => {
            let ledger = match &snapshot {
                Some(text) => Ledger::from_json_str(text)?,
                None => config.alignment()?,
            };
            let mut report = render_ledger(&ledger);
            let effects = ledger.active_effects();
            if !effects.is_empty() {
                report.push_str(&format!("effects: {}\n", effects.join(", ")));
            }
            report
        }
        Target::Profile => {
            let text = snapshot.unwrap_or_default();
            render_profile(&PersonalityProfile::from_json_str(&text)?)
        }
    };

    print!("{report}");
    Ok(())
}

/// Load the config at `path`, or the default file if it exists, or the
/// built-in defaults.
fn load_config(path: Option<&Path>) -> Result<PersonaConfig, InspectError> {
    if let Some(path) = path {
        return Ok(PersonaConfig::from_file(path)?);
    }
    let default_path = Path::new(DEFAULT_CONFIG);
    if default_path.exists() {
        Ok(PersonaConfig::from_file(default_path)?)
    } else {
        Ok(PersonaConfig::default())
    }
}

/// One line per dimension: id, value, range, subrange, history length.
fn render_ledger<K: DimensionKind>(ledger: &Ledger<K>) -> String {
    let mut out = String::new();
    for definition in ledger.catalog().definitions() {
        let value = ledger.value(&definition.id).unwrap_or(definition.default_value);
        let band = definition
            .classify(value)
            .map_or("-", |subrange| subrange.name.as_str());
        let changes = ledger.history(&definition.id).map_or(0, <[_]>::len);
        out.push_str(&format!(
            "{noun} {id:<12} {value:>8.2}  [{min}, {max}]  {band:<12} {changes} change(s)\n",
            noun = K::NOUN,
            id = definition.id,
            min = definition.min,
            max = definition.max,
        ));
    }
    out
}

/// One line per facet, grouped by kind.
fn render_profile(profile: &PersonalityProfile) -> String {
    let mut out = String::new();
    for facet in profile.traits() {
        out.push_str(&format!(
            "trait              {:<20} intensity {:.3}  base {:.3}  volatility {:.3}  {} note(s)\n",
            facet.id,
            facet.intensity,
            facet.base_level,
            facet.volatility,
            facet.notes.len()
        ));
    }
    for facet in profile.emotional_tendencies() {
        out.push_str(&format!(
            "emotionalTendency  {:<20} intensity {:.3}  base {:.3}  volatility {:.3}  {} note(s)\n",
            facet.id,
            facet.intensity,
            facet.base_level,
            facet.volatility,
            facet.notes.len()
        ));
    }
    for facet in profile.cognitive_traits() {
        out.push_str(&format!(
            "cognitiveTrait     {:<20} complexity {:.3}  adaptability {:.3}  {} note(s)\n",
            facet.id,
            facet.complexity,
            facet.adaptability,
            facet.notes.len()
        ));
    }
    for attribute in profile.attributes() {
        out.push_str(&format!(
            "attribute          {:<20} {:>3} ({:+})\n",
            attribute.id,
            attribute.base_value,
            attribute.modifier()
        ));
    }
    out
}
