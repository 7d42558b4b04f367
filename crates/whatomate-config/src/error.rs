//! Error types for whatomate-config.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The configuration document is malformed or has the wrong shape.
    #[error("failed to parse configuration: {0}")]
    Parse(#[source] Box<figment::Error>),

    /// A setting required to reach a backend is absent or empty.
    #[error("missing required setting: {0}")]
    MissingField(&'static str),

    /// A setting is present but cannot be used.
    #[error("invalid value for {key}: {reason}")]
    InvalidValue {
        /// Setting or environment variable name.
        key: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ConfigError {
    /// Create an invalid value error.
    #[must_use]
    pub fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key,
            reason: reason.into(),
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Parse(Box::new(err))
    }
}
