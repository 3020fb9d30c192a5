//! Orbis: a distributed n-body simulation of a solar system with
//! collisions.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the Orbis sub-crates. It also builds the `orbis` command-line binary.
//!
//! # Quick start
//!
//! ```rust
//! use orbis::prelude::*;
//!
//! let bodies = vec![
//!     Body::new("SUN", BodyKind::Sun, Vec3::ZERO, Vec3::ZERO, 1.989e30, 6.96e8),
//!     Body::new(
//!         "EARTH",
//!         BodyKind::Planet,
//!         Vec3::new(1.496e11, 0.0, 0.0),
//!         Vec3::new(0.0, 29_800.0, 0.0),
//!         5.97e24,
//!         6.371e6,
//!     ),
//! ];
//! let config = RunConfig {
//!     num_timesteps: 24,
//!     dt: 3600.0,
//!     display_frequency: 0,
//!     comet_odds: 0,
//!     ..RunConfig::default()
//! };
//! let finals = LocalGroup::run(2, |comm| {
//!     let mut sim = Simulation::new(comm, config.clone(), bodies.clone(), None)?;
//!     sim.run()?;
//!     Ok::<_, SimError>(sim.bodies().to_vec())
//! });
//! assert_eq!(finals[0].as_ref().unwrap(), finals[1].as_ref().unwrap());
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `orbis-core` | Bodies, vectors, ranks and tags, `SimError` |
//! | [`comm`] | `orbis-comm` | `Communicator`, in-process rank groups, body wire layout |
//! | [`config`] | `orbis-config` | Configuration file parser and belt generation |
//! | [`engine`] | `orbis-engine` | The lockstep simulation engine |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types (`orbis-core`).
pub use orbis_core as types;

/// Message-passing substrate (`orbis-comm`).
///
/// [`comm::LocalGroup`] runs a group of ranks as threads in this process.
pub use orbis_comm as comm;

/// Configuration files and belt generation (`orbis-config`).
pub use orbis_config as config;

/// The simulation engine (`orbis-engine`).
///
/// [`engine::Simulation`] is one rank's view of a run.
pub use orbis_engine as engine;

/// Common imports for typical Orbis usage.
pub mod prelude {
    pub use orbis_comm::{Communicator, LocalGroup};
    pub use orbis_config::{load, SimulationFile};
    pub use orbis_core::{Body, BodyKind, Rank, SimError, TrajectorySink, Vec3};
    pub use orbis_engine::{RunConfig, RunSummary, Simulation, StepMetrics, TrajectoryFile};
}
