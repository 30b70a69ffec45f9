//! Crate error type.

use std::path::PathBuf;

use thiserror::Error;

use crate::sample::Resolution;
use crate::state::RangeError;

/// Result alias for fallible crate operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by loading, configuration, and state edits.
#[derive(Debug, Error)]
pub enum Error {
    /// A data or config file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// A data file is not a valid sample array.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// File being parsed.
        path: PathBuf,
        /// Underlying JSON failure.
        #[source]
        source: serde_json::Error,
    },
    /// A config file is not valid TOML for [`crate::config::ViewerConfig`].
    #[error("invalid config {path}: {source}")]
    Config {
        /// Config file path.
        path: PathBuf,
        /// Underlying TOML failure.
        #[source]
        source: toml::de::Error,
    },
    /// The selected resolution has no loaded data.
    #[error("no data loaded for resolution {0}")]
    MissingResolution(Resolution),
    /// A day-range edit was rejected.
    #[error(transparent)]
    InvalidRange(#[from] RangeError),
}
