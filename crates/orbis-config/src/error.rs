//! Configuration errors.

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors raised while reading a configuration file.
///
/// [`Unreadable`](Self::Unreadable) and [`TooManyBodies`](Self::TooManyBodies)
/// are fatal. [`InvalidValue`](Self::InvalidValue) is only ever logged: the
/// offending line is skipped and parsing continues.
#[derive(Debug)]
pub enum ConfigError {
    /// The configuration file could not be opened or read.
    Unreadable {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The configured population does not fit in the body capacity.
    TooManyBodies {
        /// Number of slots the configuration needs.
        configured: usize,
        /// The fixed capacity.
        capacity: usize,
    },
    /// A value could not be parsed for its key.
    InvalidValue {
        /// The key on the offending line.
        key: String,
        /// The raw value text.
        value: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreadable { path, source } => {
                write!(f, "cannot read configuration {}: {source}", path.display())
            }
            Self::TooManyBodies {
                configured,
                capacity,
            } => write!(
                f,
                "configuration needs {configured} body slots but capacity is {capacity}"
            ),
            Self::InvalidValue { key, value } => {
                write!(f, "invalid value {value:?} for {key}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unreadable { source, .. } => Some(source),
            _ => None,
        }
    }
}
