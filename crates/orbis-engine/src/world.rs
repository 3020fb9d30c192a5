//! The per-rank simulation context.
//!
//! [`Simulation`] owns everything one rank needs: its communicator, the
//! run configuration, the body population, the current partition, the
//! coordinator's history recorder and random generator, and metrics.
//! Each [`step()`](Simulation::step) builds the timestep's
//! [`TaskQueue`] and drains it.
//!
//! # Shutdown
//!
//! [`finish()`](Simulation::finish) flushes history and logs the summary
//! on the coordinator. Dropping a `Simulation` releases everything it
//! owns; there is no other teardown.

use std::time::{Duration, Instant};

use log::{debug, info};
use orbis_comm::Communicator;
use orbis_core::{Body, SimError, TrajectorySink};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::RunConfig;
use crate::history::HistoryRecorder;
use crate::metrics::StepMetrics;
use crate::partition::{partition, GatherLayout, PartitionRange};
use crate::physics;
use crate::population::Population;
use crate::progress::{self, CollisionTally};
use crate::protocol;
use crate::scheduler::{Task, TaskQueue};

fn elapsed_us(since: Instant) -> u64 {
    since.elapsed().as_micros() as u64
}

// ── RunSummary ─────────────────────────────────────────────────────

/// Outcome of a completed run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// Timesteps executed.
    pub timesteps: u64,
    /// Large-body collision totals.
    pub tally: CollisionTally,
    /// Metrics summed over every timestep.
    pub totals: StepMetrics,
}

// ── Simulation ─────────────────────────────────────────────────────

/// One rank's view of a lockstep simulation.
pub struct Simulation<C: Communicator> {
    comm: C,
    config: RunConfig,
    population: Population,
    range: PartitionRange,
    layout: GatherLayout,
    history: Option<HistoryRecorder>,
    rng: ChaCha8Rng,
    timestep: u64,
    last_metrics: StepMetrics,
    totals: StepMetrics,
    started: Instant,
    finished: bool,
}

impl<C: Communicator> Simulation<C> {
    /// Create a rank's simulation.
    ///
    /// Every rank must be given the same `config` and `bodies`. `sink`
    /// is only used on the coordinator; without one no history is kept.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidConfig`] if `config` fails validation, and
    /// [`SimError::CapacityExceeded`] if `bodies` does not fit.
    pub fn new(
        comm: C,
        config: RunConfig,
        bodies: Vec<Body>,
        sink: Option<Box<dyn TrajectorySink + Send>>,
    ) -> Result<Self, SimError> {
        config.validate()?;
        let population = Population::new(bodies, config.max_body_size)?;
        let history = sink
            .filter(|_| comm.is_coordinator())
            .map(|sink| HistoryRecorder::new(config.history_depth, sink));
        if comm.is_coordinator() {
            info!(
                "simulation configured for {} bodies over {} ranks, timesteps={} dt={}",
                population.active_count(),
                comm.size(),
                config.num_timesteps,
                config.dt
            );
        }
        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            comm,
            config,
            population,
            range: PartitionRange::default(),
            layout: GatherLayout::default(),
            history,
            timestep: 0,
            last_metrics: StepMetrics::default(),
            totals: StepMetrics::default(),
            started: Instant::now(),
            finished: false,
        })
    }

    /// Execute one timestep.
    pub fn step(&mut self) -> Result<&StepMetrics, SimError> {
        let start = Instant::now();
        self.last_metrics = StepMetrics::default();
        self.drain(TaskQueue::for_timestep(self.comm.is_coordinator()))?;
        self.last_metrics.total_us = elapsed_us(start);
        self.totals.accumulate(&self.last_metrics);
        self.timestep += 1;
        Ok(&self.last_metrics)
    }

    /// Run the remaining timesteps and finish.
    pub fn run(&mut self) -> Result<RunSummary, SimError> {
        while self.timestep < self.config.num_timesteps {
            self.step()?;
        }
        self.finish()
    }

    /// Flush history and log the summary. Idempotent.
    pub fn finish(&mut self) -> Result<RunSummary, SimError> {
        if !self.finished {
            self.drain(TaskQueue::for_finish(self.comm.is_coordinator()))?;
            self.finished = true;
        }
        Ok(RunSummary {
            timesteps: self.timestep,
            tally: CollisionTally::from_bodies(self.population.bodies()),
            totals: self.totals.clone(),
        })
    }

    fn drain(&mut self, mut queue: TaskQueue) -> Result<(), SimError> {
        while let Some(task) = queue.pop() {
            self.execute(task)?;
        }
        Ok(())
    }

    fn execute(&mut self, task: Task) -> Result<(), SimError> {
        debug!("rank {} timestep {}: {}", self.comm.rank(), self.timestep, task.name());
        match task {
            Task::UpdatePartition => {
                let n = self.population.active_count();
                self.range = partition(n, self.comm.size(), self.comm.rank());
                self.layout = GatherLayout::new(n, self.comm.size());
            }
            Task::ComputeVelocities => {
                let start = Instant::now();
                physics::compute_velocities(self.population.bodies_mut(), self.range, self.config.dt);
                self.last_metrics.physics_us += elapsed_us(start);
            }
            Task::Barrier => self.comm.barrier()?,
            Task::UpdatePositions => {
                let start = Instant::now();
                physics::update_positions(self.population.bodies_mut(), self.range, self.config.dt);
                self.last_metrics.physics_us += elapsed_us(start);
            }
            Task::SynchronizeBodies => {
                let start = Instant::now();
                protocol::synchronize_bodies(
                    &self.comm,
                    &mut self.population,
                    self.range,
                    &self.layout,
                )?;
                self.last_metrics.sync_us += elapsed_us(start);
            }
            Task::DetectCollisions => {
                let start = Instant::now();
                let scan = self.range.mirrored(self.population.active_count());
                protocol::exchange_collisions(
                    &self.comm,
                    &mut self.population,
                    scan,
                    &mut self.rng,
                    self.config.split_odds,
                    &mut self.last_metrics,
                )?;
                self.last_metrics.collision_us += elapsed_us(start);
            }
            Task::SpawnComet => {
                if self
                    .population
                    .spawn_comet(&mut self.rng, self.config.comet_odds)?
                    .is_some()
                {
                    self.last_metrics.comets_spawned += 1;
                }
            }
            Task::BroadcastPopulation => {
                let start = Instant::now();
                protocol::broadcast_population(&self.comm, &mut self.population)?;
                self.last_metrics.sync_us += elapsed_us(start);
            }
            Task::RecordHistory => {
                if self.timestep % self.config.output_frequency == 0 {
                    if let Some(history) = &mut self.history {
                        history.record(self.population.bodies())?;
                    }
                }
            }
            Task::DisplayProgress => {
                let every = self.config.display_frequency;
                if every > 0 && self.timestep > 0 && self.timestep % every == 0 {
                    progress::report_progress(
                        self.timestep,
                        self.config.dt,
                        self.runtime(),
                        self.population.bodies(),
                    );
                }
            }
            Task::Finish => {
                if let Some(history) = &mut self.history {
                    history.finish(self.population.bodies())?;
                }
                progress::report_summary(
                    self.timestep,
                    self.config.dt,
                    self.runtime(),
                    self.population.bodies(),
                );
            }
        }
        Ok(())
    }

    /// Wall-clock time since construction.
    pub fn runtime(&self) -> Duration {
        self.started.elapsed()
    }

    /// This rank's communicator.
    pub fn comm(&self) -> &C {
        &self.comm
    }

    /// The run configuration.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// The body population as this rank currently sees it.
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// All occupied slots.
    pub fn bodies(&self) -> &[Body] {
        self.population.bodies()
    }

    /// Timesteps completed.
    pub fn timestep(&self) -> u64 {
        self.timestep
    }

    /// This rank's update range for the current timestep.
    pub fn partition(&self) -> PartitionRange {
        self.range
    }

    /// The coordinator's history recorder, if any.
    pub fn history(&self) -> Option<&HistoryRecorder> {
        self.history.as_ref()
    }

    /// Metrics from the most recent timestep.
    pub fn last_metrics(&self) -> &StepMetrics {
        &self.last_metrics
    }

    /// Metrics summed over every timestep so far.
    pub fn totals(&self) -> &StepMetrics {
        &self.totals
    }
}

impl<C: Communicator> std::fmt::Debug for Simulation<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("rank", &self.comm.rank())
            .field("size", &self.comm.size())
            .field("timestep", &self.timestep)
            .field("active_count", &self.population.active_count())
            .field("finished", &self.finished)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbis_comm::LocalGroup;
    use orbis_core::Vec3;
    use orbis_test_utils::{asteroid, planet, sun, MemorySink};

    fn config(timesteps: u64) -> RunConfig {
        RunConfig {
            num_timesteps: timesteps,
            dt: 10.0,
            output_frequency: 2,
            display_frequency: 0,
            max_body_size: 16,
            history_depth: 3,
            comet_odds: 0,
            ..RunConfig::default()
        }
    }

    fn system() -> Vec<Body> {
        vec![
            sun("SOL", Vec3::ZERO, 7e8),
            planet("EARTH", Vec3::new(1.496e11, 0.0, 0.0), 6.371e6),
            asteroid("ROCK", Vec3::new(0.0, 3e11, 0.0), 1e3),
        ]
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let comm = LocalGroup::create(1).remove(0);
        let cfg = RunConfig {
            dt: 0.0,
            ..config(1)
        };
        match Simulation::new(comm, cfg, system(), None) {
            Err(SimError::InvalidConfig { .. }) => {}
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }

    #[test]
    fn oversized_population_is_rejected_at_construction() {
        let comm = LocalGroup::create(1).remove(0);
        let cfg = RunConfig {
            max_body_size: 2,
            ..config(1)
        };
        assert!(matches!(
            Simulation::new(comm, cfg, system(), None),
            Err(SimError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn history_is_sampled_at_output_frequency() {
        let sink = MemorySink::new();
        let comm = LocalGroup::create(1).remove(0);
        let mut sim = Simulation::new(comm, config(7), system(), Some(Box::new(sink.clone()))).unwrap();
        let summary = sim.run().unwrap();
        assert_eq!(summary.timesteps, 7);
        // Timesteps 0, 2, 4, 6 are sampled; depth 3 flushes once mid-run
        // and once at the end.
        assert_eq!(sink.flushes(), 2);
        assert_eq!(sink.samples("EARTH").len(), 4);
        assert_eq!(sim.history().map(|h| h.index()), Some(0));
    }

    #[test]
    fn finish_is_idempotent() {
        let sink = MemorySink::new();
        let comm = LocalGroup::create(1).remove(0);
        let mut sim = Simulation::new(comm, config(1), system(), Some(Box::new(sink.clone()))).unwrap();
        sim.run().unwrap();
        sim.finish().unwrap();
        assert_eq!(sink.flushes(), 1);
    }

    #[test]
    fn bodies_fall_toward_the_sun() {
        let comm = LocalGroup::create(1).remove(0);
        let mut sim = Simulation::new(comm, config(3), system(), None).unwrap();
        sim.run().unwrap();
        let earth = &sim.bodies()[1];
        assert!(earth.velocity.x < 0.0);
        assert!(earth.position.x < 1.496e11);
        assert_eq!(sim.partition(), PartitionRange::new(0, 3));
    }
}
