//! Error types for the substrate and the body wire layout.

use std::fmt;
use std::io;

use orbis_core::{Rank, SimError};

/// Errors decoding the body wire layout.
#[derive(Debug)]
pub enum WireError {
    /// The buffer ended early or could not be read.
    Io(io::Error),
    /// A body kind tag is not assigned.
    UnknownKind {
        /// The unrecognised tag.
        tag: u8,
    },
    /// A body name is not valid UTF-8.
    InvalidName {
        /// Description of the decode failure.
        detail: String,
    },
    /// Bytes remained after the declared number of bodies was decoded.
    TrailingBytes {
        /// Number of unconsumed bytes.
        remaining: usize,
    },
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::UnknownKind { tag } => write!(f, "unknown body kind tag {tag}"),
            Self::InvalidName { detail } => write!(f, "invalid body name: {detail}"),
            Self::TrailingBytes { remaining } => {
                write!(f, "{remaining} trailing bytes after body records")
            }
        }
    }
}

impl std::error::Error for WireError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for WireError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Errors from the message-passing substrate.
#[derive(Debug)]
pub enum CommError {
    /// A peer's endpoint was dropped (its thread exited or panicked).
    Disconnected {
        /// The rank that went away.
        peer: Rank,
    },
    /// A destination rank outside `0..size`.
    InvalidRank {
        /// The requested rank.
        rank: Rank,
        /// The group size.
        size: usize,
    },
    /// A collective was called with arguments inconsistent with this
    /// rank's role (e.g. a non-coordinator supplying a broadcast payload).
    RoleMismatch {
        /// Description of the mismatch.
        reason: String,
    },
    /// A collective payload failed to decode.
    Wire(WireError),
}

impl fmt::Display for CommError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected { peer } => write!(f, "rank {peer} disconnected"),
            Self::InvalidRank { rank, size } => {
                write!(f, "rank {rank} out of range for group of size {size}")
            }
            Self::RoleMismatch { reason } => write!(f, "collective role mismatch: {reason}"),
            Self::Wire(e) => write!(f, "wire: {e}"),
        }
    }
}

impl std::error::Error for CommError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Wire(e) => Some(e),
            _ => None,
        }
    }
}

impl From<WireError> for CommError {
    fn from(e: WireError) -> Self {
        Self::Wire(e)
    }
}

impl From<CommError> for SimError {
    fn from(e: CommError) -> Self {
        match e {
            CommError::Wire(w) => SimError::Protocol {
                reason: w.to_string(),
            },
            other => SimError::Transport {
                reason: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_errors_map_to_protocol_violations() {
        let err: SimError = CommError::from(WireError::UnknownKind { tag: 9 }).into();
        match err {
            SimError::Protocol { reason } => assert!(reason.contains("9")),
            other => panic!("expected Protocol, got {other:?}"),
        }
    }

    #[test]
    fn disconnects_map_to_transport_failures() {
        let err: SimError = CommError::Disconnected { peer: Rank(2) }.into();
        assert!(matches!(err, SimError::Transport { .. }));
    }
}
