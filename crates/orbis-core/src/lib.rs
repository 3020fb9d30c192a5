//! Core types for the Orbis distributed n-body simulation.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the body record every rank holds a copy of, the body-kind tag used
//! to dispatch collision rules, rank and message-tag identifiers, the
//! fatal error type shared by the engine, and the [`TrajectorySink`]
//! boundary that history is flushed through.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod body;
pub mod constants;
pub mod error;
pub mod id;
pub mod sink;
pub mod vector;

pub use body::{Body, BodyKind};
pub use error::SimError;
pub use id::{Rank, Tag, COORDINATOR, DONE_TAG};
pub use sink::TrajectorySink;
pub use vector::Vec3;
