//! Test utilities for Orbis development.
//!
//! Provides body fixtures with realistic masses and an in-memory
//! [`TrajectorySink`](orbis_core::TrajectorySink) for asserting on
//! recorded history.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod sink;

pub use fixtures::{asteroid, comet, moon, planet, sun};
pub use sink::MemorySink;
