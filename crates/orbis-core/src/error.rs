//! Fatal simulation errors.
//!
//! Every variant terminates the run. There is no recovery path: the
//! binary logs the error and exits with a non-zero status.

use std::error::Error;
use std::fmt;

/// Errors that abort a simulation run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimError {
    /// Committing a population change would exceed `max_body_size`.
    CapacityExceeded {
        /// Occupied slots the change would require.
        requested: usize,
        /// The fixed capacity.
        capacity: usize,
    },
    /// The message-passing substrate failed (a peer disconnected).
    Transport {
        /// Description of the failure.
        reason: String,
    },
    /// A peer sent data inconsistent with the agreed protocol.
    Protocol {
        /// Description of the violation.
        reason: String,
    },
    /// The trajectory sink could not be written.
    Sink {
        /// Description of the I/O failure.
        reason: String,
    },
    /// The run parameters failed validation.
    InvalidConfig {
        /// Which parameter was rejected and why.
        reason: String,
    },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded {
                requested,
                capacity,
            } => write!(
                f,
                "body capacity exceeded: {requested} slots requested, capacity is {capacity}"
            ),
            Self::Transport { reason } => write!(f, "transport failure: {reason}"),
            Self::Protocol { reason } => write!(f, "protocol violation: {reason}"),
            Self::Sink { reason } => write!(f, "trajectory sink failed: {reason}"),
            Self::InvalidConfig { reason } => write!(f, "invalid run configuration: {reason}"),
        }
    }
}

impl Error for SimError {}

impl From<std::io::Error> for SimError {
    fn from(e: std::io::Error) -> Self {
        Self::Sink {
            reason: e.to_string(),
        }
    }
}
