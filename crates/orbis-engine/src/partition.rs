//! Static stride partitioning of the occupied body slots.
//!
//! Each rank owns `active_count / size` consecutive slots; the last rank
//! also takes the remainder. Partitions are recomputed every timestep
//! because collisions and comets can grow the population.

use std::ops::Range;

use orbis_core::Rank;
use smallvec::SmallVec;

/// A half-open slot range `[start, end)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PartitionRange {
    /// First slot, inclusive.
    pub start: usize,
    /// Last slot, exclusive.
    pub end: usize,
}

impl PartitionRange {
    /// Construct `[start, end)`.
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "inverted range {start}..{end}");
        Self { start, end }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the range has no slots.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The slots as a standard range.
    pub fn slots(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Reflect this range across `[0, active_count)`.
    ///
    /// Used for the outer loop of collision detection. Low slots are
    /// paired with more partners than high slots (only `j > i` is
    /// checked), so a rank whose update range is low scans high, and
    /// vice versa.
    pub fn mirrored(&self, active_count: usize) -> Self {
        Self::new(active_count - self.end, active_count - self.start)
    }
}

/// The update range of `rank` in a group of `size` over `active_count`
/// occupied slots.
pub fn partition(active_count: usize, size: usize, rank: Rank) -> PartitionRange {
    if size <= 1 {
        return PartitionRange::new(0, active_count);
    }
    let stride = active_count / size;
    let start = rank.0 * stride;
    let end = if rank.0 == size - 1 {
        active_count
    } else {
        start + stride
    };
    PartitionRange::new(start, end)
}

/// Per-rank element counts and displacements for collecting every
/// rank's update range at the coordinator.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GatherLayout {
    /// Slots contributed by each rank.
    pub counts: SmallVec<[usize; 8]>,
    /// First slot of each rank's contribution.
    pub displacements: SmallVec<[usize; 8]>,
}

impl GatherLayout {
    /// Layout for a group of `size` over `active_count` occupied slots.
    pub fn new(active_count: usize, size: usize) -> Self {
        let (counts, displacements) = (0..size.max(1))
            .map(|r| {
                let range = partition(active_count, size, Rank(r));
                (range.len(), range.start)
            })
            .unzip();
        Self {
            counts,
            displacements,
        }
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// The range contributed by `rank`.
    pub fn range_of(&self, rank: Rank) -> PartitionRange {
        let start = self.displacements[rank.0];
        PartitionRange::new(start, start + self.counts[rank.0])
    }
}
