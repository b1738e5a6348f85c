//! Error taxonomy
//!
//! None of these ever reach the player: catalog errors fall through to the
//! next level source, sensor errors degrade the pickup light, settings errors
//! fall back to defaults.

use thiserror::Error;

/// A level source could not produce a usable catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The level file could not be read.
    #[error("cannot read level source {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The level file is not valid level JSON.
    #[error("malformed level source: {0}")]
    Parse(#[from] serde_json::Error),
    /// The level data parsed but is not playable.
    #[error("invalid level data: {0}")]
    Invalid(String),
}

/// The accelerometer could not deliver a sample.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SensorError {
    /// No sensor answered on the bus; permanent for this boot.
    #[error("accelerometer not present")]
    Unavailable,
    /// A single read failed; the next one may succeed.
    #[error("accelerometer read failed: {0}")]
    ReadFailed(String),
}

/// The device settings file could not be used.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed settings: {0}")]
    Parse(#[from] serde_json::Error),
}
