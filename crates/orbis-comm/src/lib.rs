//! Message-passing substrate for Orbis.
//!
//! The engine talks to its peers exclusively through the
//! [`Communicator`] trait: rank/size queries, tagged point-to-point
//! messages (non-blocking with an explicit completion wait, or
//! synchronous), collect-to-coordinator, broadcast from the coordinator
//! and a barrier.
//!
//! # Architecture
//!
//! - [`Communicator`] is the contract the engine is written against
//! - [`LocalGroup`] builds a group of [`ChannelComm`] endpoints backed by
//!   crossbeam channels, one per rank, each driven by its own thread
//! - [`wire`] defines the fixed, ordered field layout a [`Body`] takes
//!   when it crosses a collective
//!
//! [`Body`]: orbis_core::Body

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod communicator;
pub mod error;
pub mod local;
pub mod wire;

pub use communicator::{wait_all, Communicator, Message, SendRequest};
pub use error::{CommError, WireError};
pub use local::{ChannelComm, LocalGroup};
