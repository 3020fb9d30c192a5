//! Per-timestep counters and phase timings.

use crate::resolution::Outcome;

/// Counters and timings collected during a single timestep.
///
/// Durations are in microseconds. Collision counters are only populated
/// on the coordinator, which is the only rank that resolves collisions;
/// `reports_sent` is only populated on peers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepMetrics {
    /// Wall-clock time for the whole timestep.
    pub total_us: u64,
    /// Time spent computing velocities and positions.
    pub physics_us: u64,
    /// Time spent in collect/broadcast of bodies.
    pub sync_us: u64,
    /// Time spent detecting, reporting and resolving collisions.
    pub collision_us: u64,
    /// Collisions whose rule changed at least one body.
    pub collisions_resolved: u64,
    /// Collision reports this rank sent to the coordinator.
    pub reports_sent: u64,
    /// Collision reports the coordinator received from peers.
    pub reports_received: u64,
    /// Asteroid pairs that split.
    pub splits: u64,
    /// Comets that entered the system.
    pub comets_spawned: u64,
}

impl StepMetrics {
    /// Count the effect of one resolution.
    pub fn record_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Skipped | Outcome::Ignored => {}
            Outcome::Split { .. } => {
                self.splits += 1;
                self.collisions_resolved += 1;
            }
            _ => self.collisions_resolved += 1,
        }
    }

    /// Add another timestep's metrics into this running total.
    pub fn accumulate(&mut self, other: &StepMetrics) {
        self.total_us += other.total_us;
        self.physics_us += other.physics_us;
        self.sync_us += other.sync_us;
        self.collision_us += other.collision_us;
        self.collisions_resolved += other.collisions_resolved;
        self.reports_sent += other.reports_sent;
        self.reports_received += other.reports_received;
        self.splits += other.splits;
        self.comets_spawned += other.comets_spawned;
    }
}
