//! Strongly-typed identifiers for ranks and message tags.

use std::fmt;

/// Identifies one process (rank) within a fixed-size group.
///
/// Ranks are dense: a group of size `P` has ranks `0..P`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rank(pub usize);

impl Rank {
    /// Whether this rank is the [`COORDINATOR`].
    pub fn is_coordinator(self) -> bool {
        self == COORDINATOR
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for Rank {
    fn from(v: usize) -> Self {
        Self(v)
    }
}

/// The rank that aggregates collision reports, owns the trajectory
/// history and is the root of every collective operation.
pub const COORDINATOR: Rank = Rank(0);

/// Tag attached to a point-to-point message.
///
/// Collision reports are tagged with the sender's rank, which is never
/// zero for a sender. [`DONE_TAG`] is reserved for completion signals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub u32);

impl Tag {
    /// The report tag used by `rank`.
    pub fn for_rank(rank: Rank) -> Self {
        Self(rank.0 as u32)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Tag {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Reserved tag marking a peer's "done" message.
pub const DONE_TAG: Tag = Tag(0);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinator_is_rank_zero() {
        assert!(Rank(0).is_coordinator());
        assert!(!Rank(3).is_coordinator());
    }

    #[test]
    fn report_tags_never_collide_with_done() {
        for r in 1..64 {
            assert_ne!(Tag::for_rank(Rank(r)), DONE_TAG);
        }
    }
}
