//! Simulation configuration for Orbis.
//!
//! Reads the line-oriented `KEY=VALUE` configuration format into a
//! [`SimulationFile`] and appends procedurally generated asteroid-belt
//! and Kuiper-belt bodies.
//!
//! Malformed lines are logged and skipped. Only an unreadable file or a
//! body population that cannot fit in the configured capacity is fatal.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod belts;
pub mod error;
pub mod parse;

pub use belts::{append_belts, asteroid_belt, kuiper_belt};
pub use error::ConfigError;
pub use parse::{load, parse_str, SimulationFile, DEFAULT_MAX_BODY_SIZE};
