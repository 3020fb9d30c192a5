//! Per-timestep task pipeline.
//!
//! Each timestep a rank builds a [`TaskQueue`] for its role and drains it
//! to completion before the next timestep's queue is built. Every rank
//! enqueues the collective tasks in the same order; only the coordinator
//! enqueues the tasks that touch state it alone owns.

use std::collections::VecDeque;

/// One step of the per-timestep pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Task {
    /// Recompute this rank's update range and the gather layout.
    UpdatePartition,
    /// Integrate velocities over the update range.
    ComputeVelocities,
    /// Wait for every rank.
    Barrier,
    /// Integrate positions over the update range.
    UpdatePositions,
    /// Collect every update range at the coordinator and broadcast the
    /// full body array.
    SynchronizeBodies,
    /// Scan the mirrored range and exchange collision reports.
    DetectCollisions,
    /// Possibly add a comet. Coordinator only.
    SpawnComet,
    /// Broadcast the occupied-slot count and then the body array.
    BroadcastPopulation,
    /// Sample trajectories. Coordinator only.
    RecordHistory,
    /// Log progress. Coordinator only.
    DisplayProgress,
    /// Flush history and log the summary. Coordinator only.
    Finish,
}

impl Task {
    /// Whether only the coordinator runs this task.
    pub fn coordinator_only(self) -> bool {
        matches!(
            self,
            Self::SpawnComet | Self::RecordHistory | Self::DisplayProgress | Self::Finish
        )
    }

    /// Stable snake-case name.
    pub fn name(self) -> &'static str {
        match self {
            Self::UpdatePartition => "update_partition",
            Self::ComputeVelocities => "compute_velocities",
            Self::Barrier => "barrier",
            Self::UpdatePositions => "update_positions",
            Self::SynchronizeBodies => "synchronize_bodies",
            Self::DetectCollisions => "detect_collisions",
            Self::SpawnComet => "spawn_comet",
            Self::BroadcastPopulation => "broadcast_population",
            Self::RecordHistory => "record_history",
            Self::DisplayProgress => "display_progress",
            Self::Finish => "finish",
        }
    }
}

const TIMESTEP_PIPELINE: [Task; 10] = [
    Task::UpdatePartition,
    Task::ComputeVelocities,
    Task::Barrier,
    Task::UpdatePositions,
    Task::SynchronizeBodies,
    Task::DetectCollisions,
    Task::SpawnComet,
    Task::BroadcastPopulation,
    Task::RecordHistory,
    Task::DisplayProgress,
];

/// FIFO of tasks for one rank.
#[derive(Clone, Debug, Default)]
pub struct TaskQueue {
    tasks: VecDeque<Task>,
}

impl TaskQueue {
    /// An empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// The tasks of one timestep for a rank of the given role.
    pub fn for_timestep(coordinator: bool) -> Self {
        Self::filtered(&TIMESTEP_PIPELINE, coordinator)
    }

    /// The end-of-run tasks for a rank of the given role.
    pub fn for_finish(coordinator: bool) -> Self {
        Self::filtered(&[Task::Finish], coordinator)
    }

    fn filtered(tasks: &[Task], coordinator: bool) -> Self {
        tasks
            .iter()
            .copied()
            .filter(|t| coordinator || !t.coordinator_only())
            .collect()
    }

    /// Append a task.
    pub fn push(&mut self, task: Task) {
        self.tasks.push_back(task);
    }

    /// Take the next task.
    pub fn pop(&mut self) -> Option<Task> {
        self.tasks.pop_front()
    }

    /// Tasks remaining.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the queue is drained.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Remaining tasks in order.
    pub fn iter(&self) -> impl Iterator<Item = Task> + '_ {
        self.tasks.iter().copied()
    }
}

impl FromIterator<Task> for TaskQueue {
    fn from_iter<I: IntoIterator<Item = Task>>(iter: I) -> Self {
        Self {
            tasks: iter.into_iter().collect(),
        }
    }
}
