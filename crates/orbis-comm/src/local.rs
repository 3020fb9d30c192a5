//! In-process process group backed by crossbeam channels.
//!
//! Each rank is a thread holding one [`ChannelComm`]. Point-to-point
//! traffic goes through a single unbounded inbox per rank so the
//! coordinator can receive from any source. Collective traffic uses a
//! dedicated channel per `(source, destination)` pair, which keeps it
//! FIFO per pair and never interleaved with point-to-point messages.
//!
//! A send is complete once the receiver has dequeued it: every envelope
//! carries a one-shot acknowledgement channel that the receiver signals.

use std::sync::{Arc, Barrier};
use std::thread;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use log::trace;
use orbis_core::{Rank, Tag, COORDINATOR};

use crate::communicator::{Communicator, Message, SendRequest};
use crate::error::CommError;

struct Envelope {
    message: Message,
    ack: Sender<()>,
}

/// One rank's endpoint in a [`LocalGroup`].
pub struct ChannelComm {
    rank: Rank,
    inbox: Receiver<Envelope>,
    /// Inbox senders, indexed by destination rank.
    outboxes: Arc<[Sender<Envelope>]>,
    /// Collective receivers, indexed by source rank.
    collective_rx: Vec<Receiver<Vec<u8>>>,
    /// Collective senders, indexed by destination rank.
    collective_tx: Vec<Sender<Vec<u8>>>,
    barrier: Arc<Barrier>,
}

/// Factory for groups of in-process ranks.
pub struct LocalGroup;

impl LocalGroup {
    /// Create the endpoints for a group of `size` ranks, in rank order.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn create(size: usize) -> Vec<ChannelComm> {
        assert!(size > 0, "a process group needs at least one rank");

        let (inbox_tx, inbox_rx): (Vec<_>, Vec<_>) = (0..size).map(|_| unbounded()).unzip();
        let outboxes: Arc<[Sender<Envelope>]> = inbox_tx.into();

        // collective_tx[src][dst] pairs with collective_rx[dst][src].
        let mut collective_tx: Vec<Vec<Sender<Vec<u8>>>> = Vec::with_capacity(size);
        let mut collective_rx: Vec<Vec<Receiver<Vec<u8>>>> =
            (0..size).map(|_| Vec::with_capacity(size)).collect();
        for _src in 0..size {
            let mut row = Vec::with_capacity(size);
            for rx_column in collective_rx.iter_mut() {
                let (tx, rx) = unbounded();
                row.push(tx);
                rx_column.push(rx);
            }
            collective_tx.push(row);
        }

        let barrier = Arc::new(Barrier::new(size));

        inbox_rx
            .into_iter()
            .zip(collective_tx)
            .zip(collective_rx)
            .enumerate()
            .map(|(rank, ((inbox, tx), rx))| ChannelComm {
                rank: Rank(rank),
                inbox,
                outboxes: Arc::clone(&outboxes),
                collective_rx: rx,
                collective_tx: tx,
                barrier: Arc::clone(&barrier),
            })
            .collect()
    }

    /// Run `f` once per rank on its own thread and collect the results in
    /// rank order.
    ///
    /// If any rank panics the panic is propagated after all threads have
    /// been joined.
    pub fn run<T, F>(size: usize, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(ChannelComm) -> T + Sync,
    {
        let comms = Self::create(size);
        let f = &f;
        thread::scope(|s| {
            let handles: Vec<_> = comms
                .into_iter()
                .map(|comm| s.spawn(move || f(comm)))
                .collect();
            handles
                .into_iter()
                .map(|h| match h.join() {
                    Ok(v) => v,
                    Err(payload) => std::panic::resume_unwind(payload),
                })
                .collect()
        })
    }
}

impl ChannelComm {
    fn check_rank(&self, rank: Rank) -> Result<(), CommError> {
        if rank.0 >= self.outboxes.len() {
            return Err(CommError::InvalidRank {
                rank,
                size: self.outboxes.len(),
            });
        }
        Ok(())
    }
}

impl Communicator for ChannelComm {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn size(&self) -> usize {
        self.outboxes.len()
    }

    fn isend(&self, dest: Rank, tag: Tag, value: u64) -> Result<SendRequest, CommError> {
        self.check_rank(dest)?;
        let (ack_tx, ack_rx) = bounded(1);
        let envelope = Envelope {
            message: Message {
                source: self.rank,
                tag,
                value,
            },
            ack: ack_tx,
        };
        trace!("rank {} -> {dest}: tag {tag} value {value}", self.rank);
        self.outboxes[dest.0]
            .send(envelope)
            .map_err(|_| CommError::Disconnected { peer: dest })?;
        Ok(SendRequest::pending(dest, ack_rx))
    }

    fn recv_any(&self) -> Result<Message, CommError> {
        // Never disconnected: this endpoint holds a sender to its own inbox.
        let envelope = self
            .inbox
            .recv()
            .map_err(|_| CommError::Disconnected { peer: self.rank })?;
        // The sender may have dropped its request without waiting.
        let _ = envelope.ack.send(());
        trace!(
            "rank {} <- {}: tag {} value {}",
            self.rank,
            envelope.message.source,
            envelope.message.tag,
            envelope.message.value
        );
        Ok(envelope.message)
    }

    fn gather(&self, local: Vec<u8>) -> Result<Option<Vec<Vec<u8>>>, CommError> {
        if !self.is_coordinator() {
            self.collective_tx[COORDINATOR.0]
                .send(local)
                .map_err(|_| CommError::Disconnected { peer: COORDINATOR })?;
            return Ok(None);
        }
        let mut buffers = Vec::with_capacity(self.size());
        for (source, rx) in self.collective_rx.iter().enumerate() {
            if source == self.rank.0 {
                buffers.push(Vec::new());
                continue;
            }
            let buf = rx.recv().map_err(|_| CommError::Disconnected {
                peer: Rank(source),
            })?;
            buffers.push(buf);
        }
        buffers[self.rank.0] = local;
        Ok(Some(buffers))
    }

    fn broadcast(&self, payload: Option<Vec<u8>>) -> Result<Vec<u8>, CommError> {
        match (self.is_coordinator(), payload) {
            (true, Some(payload)) => {
                for (dest, tx) in self.collective_tx.iter().enumerate() {
                    if dest == self.rank.0 {
                        continue;
                    }
                    tx.send(payload.clone())
                        .map_err(|_| CommError::Disconnected { peer: Rank(dest) })?;
                }
                Ok(payload)
            }
            (false, None) => self.collective_rx[COORDINATOR.0]
                .recv()
                .map_err(|_| CommError::Disconnected { peer: COORDINATOR }),
            (true, None) => Err(CommError::RoleMismatch {
                reason: "coordinator must supply the broadcast payload".to_string(),
            }),
            (false, Some(_)) => Err(CommError::RoleMismatch {
                reason: format!("rank {} supplied a broadcast payload", self.rank),
            }),
        }
    }

    fn barrier(&self) -> Result<(), CommError> {
        self.barrier.wait();
        Ok(())
    }
}

impl std::fmt::Debug for ChannelComm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelComm")
            .field("rank", &self.rank)
            .field("size", &self.size())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbis_core::DONE_TAG;

    #[test]
    fn create_assigns_dense_ranks() {
        let comms = LocalGroup::create(4);
        let ranks: Vec<_> = comms.iter().map(|c| c.rank()).collect();
        assert_eq!(ranks, vec![Rank(0), Rank(1), Rank(2), Rank(3)]);
        assert!(comms.iter().all(|c| c.size() == 4));
    }

    #[test]
    fn run_returns_results_in_rank_order() {
        let out = LocalGroup::run(3, |comm| comm.rank().0 * 10);
        assert_eq!(out, vec![0, 10, 20]);
    }

    #[test]
    fn isend_to_missing_rank_fails() {
        let comms = LocalGroup::create(2);
        match comms[0].isend(Rank(5), Tag(1), 0) {
            Err(CommError::InvalidRank { rank, size }) => {
                assert_eq!(rank, Rank(5));
                assert_eq!(size, 2);
            }
            other => panic!("expected InvalidRank, got {other:?}"),
        }
    }

    #[test]
    fn coordinator_receives_from_any_source_and_done_tags() {
        let received = LocalGroup::run(3, |comm| {
            if comm.is_coordinator() {
                let mut done = 0;
                let mut values = Vec::new();
                while done < comm.size() - 1 {
                    let msg = comm.recv_any().unwrap();
                    if msg.tag == DONE_TAG {
                        done += 1;
                    } else {
                        assert_eq!(msg.tag, Tag::for_rank(msg.source));
                        values.push(msg.value);
                    }
                }
                values.sort_unstable();
                values
            } else {
                let tag = Tag::for_rank(comm.rank());
                let reqs = vec![
                    comm.isend(COORDINATOR, tag, comm.rank().0 as u64 * 100).unwrap(),
                    comm.isend(COORDINATOR, tag, comm.rank().0 as u64 * 100 + 1).unwrap(),
                ];
                crate::wait_all(reqs).unwrap();
                comm.ssend(COORDINATOR, DONE_TAG, 2).unwrap();
                Vec::new()
            }
        });
        assert_eq!(received[0], vec![100, 101, 200, 201]);
    }

    #[test]
    fn gather_places_buffers_by_rank_in_place() {
        let out = LocalGroup::run(3, |comm| {
            let local = if comm.is_coordinator() {
                vec![0xAA]
            } else {
                vec![comm.rank().0 as u8; comm.rank().0]
            };
            comm.gather(local).unwrap()
        });
        assert_eq!(out[0], Some(vec![vec![0xAA], vec![1], vec![2, 2]]));
        assert_eq!(out[1], None);
        assert_eq!(out[2], None);
    }

    #[test]
    fn broadcast_delivers_coordinator_payload_everywhere() {
        let out = LocalGroup::run(4, |comm| {
            let payload = comm.is_coordinator().then(|| b"orbit".to_vec());
            comm.broadcast(payload).unwrap()
        });
        assert!(out.iter().all(|p| p == b"orbit"));
    }

    #[test]
    fn broadcast_rejects_payload_from_peer() {
        let comms = LocalGroup::create(2);
        match comms[1].broadcast(Some(vec![1])) {
            Err(CommError::RoleMismatch { .. }) => {}
            other => panic!("expected RoleMismatch, got {other:?}"),
        }
    }

    #[test]
    fn consecutive_collectives_stay_ordered() {
        let out = LocalGroup::run(3, |comm| {
            let first = comm.broadcast(comm.is_coordinator().then(|| vec![1])).unwrap();
            comm.barrier().unwrap();
            let second = comm.broadcast(comm.is_coordinator().then(|| vec![2])).unwrap();
            (first, second)
        });
        for (first, second) in out {
            assert_eq!(first, vec![1]);
            assert_eq!(second, vec![2]);
        }
    }

    #[test]
    fn single_rank_group_collectives_are_local() {
        let comms = LocalGroup::create(1);
        let comm = &comms[0];
        assert_eq!(comm.gather(vec![9]).unwrap(), Some(vec![vec![9]]));
        assert_eq!(comm.broadcast(Some(vec![4])).unwrap(), vec![4]);
        comm.barrier().unwrap();
    }
}
