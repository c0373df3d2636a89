//! Configuration for the Persona character model.
//!
//! Everything a host tunes without recompiling lives in one YAML file:
//! catalog templates for influence, prestige, and alignment, per-track
//! prestige decay, optional replacement rule tables for trait evolution,
//! and the log level.
//!
//! # Modules
//!
//! - [`config`] -- [`PersonaConfig`] and its sections, loaded with
//!   `serde_yml` and validated on load.
//!
//! [`PersonaConfig`]: config::PersonaConfig

pub mod config;

pub use config::{ConfigError, PersonaConfig};
