//! Distributed n-body simulation engine for Orbis.
//!
//! A fixed group of ranks runs in lockstep. Each timestep every rank
//! integrates its slice of the body array, the slices are collected at
//! the coordinator and broadcast back, and then collisions are detected
//! across mirrored slices. Peers report their hits to the coordinator,
//! which resolves every collision and broadcasts the resulting
//! population so all ranks again hold an identical body array.
//!
//! # Architecture
//!
//! - [`partition`] splits the occupied slots across ranks
//! - [`physics`] integrates gravity over a slice
//! - [`detection`] finds overlapping pairs and encodes them as pair codes
//! - [`protocol`] moves bodies and collision reports between ranks
//! - [`resolution`] applies the collision rule for each body-kind pair
//! - [`population`] owns the body array and enforces capacity
//! - [`history`] buffers trajectory samples on the coordinator
//! - [`scheduler`] orders the per-timestep tasks
//! - [`world`] ties these together in [`Simulation`]

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod detection;
pub mod history;
pub mod metrics;
pub mod partition;
pub mod physics;
pub mod population;
pub mod progress;
pub mod protocol;
pub mod resolution;
pub mod scheduler;
pub mod world;

pub use config::{RunConfig, RunConfigError};
pub use history::{HistoryRecorder, TrajectoryFile};
pub use orbis_core::TrajectorySink;
pub use metrics::StepMetrics;
pub use partition::{GatherLayout, PartitionRange};
pub use population::Population;
pub use resolution::{CollisionRule, Outcome};
pub use world::{RunSummary, Simulation};
