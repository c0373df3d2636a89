//! Error types for the inspector binary.

use persona_core::ConfigError;
use persona_ledger::{ConfigurationError, LedgerError};
use persona_traits::ProfileError;

/// Top-level error for the inspector.
///
/// Each variant wraps a library error so `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum InspectError {
    /// The command line could not be understood.
    #[error("{message}\n\n{usage}", usage = crate::USAGE)]
    Usage {
        /// What was wrong with the arguments.
        message: String,
    },

    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// A configured catalog was rejected.
    #[error("catalog error: {source}")]
    Catalog {
        /// The underlying catalog error.
        #[from]
        source: ConfigurationError,
    },

    /// A ledger snapshot could not be loaded or updated.
    #[error("ledger error: {source}")]
    Ledger {
        /// The underlying ledger error.
        #[from]
        source: LedgerError,
    },

    /// A profile snapshot could not be loaded.
    #[error("profile error: {source}")]
    Profile {
        /// The underlying profile error.
        #[from]
        source: ProfileError,
    },

    /// A snapshot file could not be read.
    #[error("failed to read snapshot: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
