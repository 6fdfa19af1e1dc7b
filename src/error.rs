//! Error types.
//!
//! Decoding never fails: unmapped input, unknown devices and exhausted slots
//! are ordinary outcomes. Errors only arise at the edges, when configuration
//! or device-database files are read and written, or when a HID backend
//! cannot talk to the platform.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration loading / saving failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Device database import / export failures.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("cannot access device database {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed device database: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown {kind} scheme selector {value}")]
    UnknownScheme { kind: &'static str, value: u8 },
}

/// HID platform layer failures.
#[derive(Debug, Error)]
pub enum BackendError {
    #[cfg(feature = "hid")]
    #[error("HID API error: {0}")]
    Hid(#[from] hidapi::HidError),

    #[error("HID backend unavailable: {0}")]
    Unavailable(String),
}
