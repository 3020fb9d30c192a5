//! The `Communicator` trait: the substrate contract the engine consumes.

use crossbeam_channel::Receiver;
use orbis_core::{Rank, Tag};

use crate::error::CommError;

/// A received point-to-point message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Message {
    /// The sending rank.
    pub source: Rank,
    /// The tag the sender attached.
    pub tag: Tag,
    /// The single integer payload.
    pub value: u64,
}

/// Handle to an outstanding non-blocking send.
///
/// The send completes once the destination has received the message.
/// Dropping the handle without waiting is allowed; the message is still
/// delivered.
#[derive(Debug)]
#[must_use = "a send request should be waited on"]
pub struct SendRequest {
    dest: Rank,
    state: RequestState,
}

#[derive(Debug)]
enum RequestState {
    Complete,
    Pending(Receiver<()>),
}

impl SendRequest {
    /// A request that is already complete.
    pub fn completed(dest: Rank) -> Self {
        Self {
            dest,
            state: RequestState::Complete,
        }
    }

    /// A request that completes when `ack` yields.
    pub fn pending(dest: Rank, ack: Receiver<()>) -> Self {
        Self {
            dest,
            state: RequestState::Pending(ack),
        }
    }

    /// The destination rank.
    pub fn dest(&self) -> Rank {
        self.dest
    }

    /// Block until the destination has received the message.
    pub fn wait(self) -> Result<(), CommError> {
        match self.state {
            RequestState::Complete => Ok(()),
            RequestState::Pending(ack) => ack
                .recv()
                .map_err(|_| CommError::Disconnected { peer: self.dest }),
        }
    }
}

/// Wait for every request to complete, in order.
pub fn wait_all(requests: impl IntoIterator<Item = SendRequest>) -> Result<(), CommError> {
    for request in requests {
        request.wait()?;
    }
    Ok(())
}

/// One rank's endpoint into a fixed-size process group.
///
/// All collectives are rooted at [`COORDINATOR`](orbis_core::COORDINATOR)
/// and must be entered by every rank in the same order. Receives block
/// indefinitely: there are no timeouts, and a missing message is a
/// deadlock rather than an error.
pub trait Communicator: Send {
    /// This endpoint's rank.
    fn rank(&self) -> Rank;

    /// Number of ranks in the group.
    fn size(&self) -> usize;

    /// Whether this endpoint is the coordinator.
    fn is_coordinator(&self) -> bool {
        self.rank().is_coordinator()
    }

    /// Start a send of `value` to `dest` and return immediately.
    fn isend(&self, dest: Rank, tag: Tag, value: u64) -> Result<SendRequest, CommError>;

    /// Send `value` to `dest` and block until it has been received.
    fn ssend(&self, dest: Rank, tag: Tag, value: u64) -> Result<(), CommError> {
        self.isend(dest, tag, value)?.wait()
    }

    /// Receive the next message from any source with any tag.
    fn recv_any(&self) -> Result<Message, CommError>;

    /// Collect one buffer from every rank at the coordinator.
    ///
    /// The coordinator receives `Some(buffers)` indexed by rank, with its
    /// own slot holding the `local` it passed (in-place semantics: it
    /// normally passes an empty buffer). Every other rank gets `None`.
    fn gather(&self, local: Vec<u8>) -> Result<Option<Vec<Vec<u8>>>, CommError>;

    /// Distribute the coordinator's payload to every rank.
    ///
    /// The coordinator passes `Some(payload)`, everyone else `None`. All
    /// ranks return the coordinator's payload.
    fn broadcast(&self, payload: Option<Vec<u8>>) -> Result<Vec<u8>, CommError>;

    /// Block until every rank has entered the barrier.
    fn barrier(&self) -> Result<(), CommError>;
}
