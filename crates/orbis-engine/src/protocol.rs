//! Cross-rank body synchronisation and collision report exchange.
//!
//! Every function here is a collective step: all ranks must call it in
//! the same order with consistent arguments.

use log::trace;
use orbis_comm::wire::{decode_bodies, decode_count, encode_bodies, encode_count};
use orbis_comm::{wait_all, CommError, Communicator};
use orbis_core::{Rank, SimError, Tag, COORDINATOR, DONE_TAG};
use rand::Rng;
use smallvec::{smallvec, SmallVec};

use crate::detection::{PairCode, PairScanner};
use crate::metrics::StepMetrics;
use crate::partition::{GatherLayout, PartitionRange};
use crate::population::Population;
use crate::resolution::resolve;

/// Initial capacity of a peer's outstanding-report list.
const REPORT_BUFFER: usize = 10;

/// Collect every rank's update range at the coordinator, then broadcast
/// the coordinator's full body array to everyone.
pub fn synchronize_bodies<C: Communicator + ?Sized>(
    comm: &C,
    population: &mut Population,
    range: PartitionRange,
    layout: &GatherLayout,
) -> Result<(), SimError> {
    if !comm.is_coordinator() {
        let local = encode_bodies(&population.bodies()[range.slots()]);
        comm.gather(local)?;
        let bytes = comm.broadcast(None)?;
        let bodies = decode_bodies(&bytes).map_err(CommError::from)?;
        return population.replace_all(bodies);
    }

    let buffers = comm.gather(Vec::new())?.ok_or_else(|| SimError::Protocol {
        reason: "coordinator received no gather result".to_string(),
    })?;
    for (source, bytes) in buffers.into_iter().enumerate().skip(1) {
        let bodies = decode_bodies(&bytes).map_err(CommError::from)?;
        let expected = layout.counts[source];
        if bodies.len() != expected {
            return Err(SimError::Protocol {
                reason: format!(
                    "rank {source} sent {} bodies, expected {expected}",
                    bodies.len()
                ),
            });
        }
        population.overwrite(layout.displacements[source], bodies)?;
    }
    comm.broadcast(Some(encode_bodies(population.bodies())))?;
    Ok(())
}

/// Detect collisions over `scan` and bring every one of them to the
/// coordinator for resolution.
///
/// Peers send one report per hit tagged with their rank, wait for every
/// report to be received, and then synchronously send a completion
/// message carrying their report count. The coordinator scans its own
/// range, receives from any peer until each has sent its completion
/// message, and only then resolves the whole set in ascending `(i, j)`
/// order. The result does not depend on the group size or on the order
/// in which reports arrived.
pub fn exchange_collisions<C, R>(
    comm: &C,
    population: &mut Population,
    scan: PartitionRange,
    rng: &mut R,
    split_odds: u32,
    metrics: &mut StepMetrics,
) -> Result<(), SimError>
where
    C: Communicator + ?Sized,
    R: Rng + ?Sized,
{
    let limit = population.active_count();
    let mut scanner = PairScanner::new(scan, limit);

    if !comm.is_coordinator() {
        let capacity = population.capacity();
        let tag = Tag::for_rank(comm.rank());
        let mut requests = Vec::with_capacity(REPORT_BUFFER);
        while let Some((i, j)) = scanner.next_hit(population.bodies()) {
            let code = PairCode::encode(i, j, capacity);
            requests.push(comm.isend(COORDINATOR, tag, code.0)?);
        }
        let sent = requests.len() as u64;
        wait_all(requests)?;
        comm.ssend(COORDINATOR, DONE_TAG, sent)?;
        metrics.reports_sent += sent;
        trace!("rank {} sent {sent} collision reports", comm.rank());
        return Ok(());
    }

    let mut hits: Vec<(usize, usize)> = Vec::with_capacity(REPORT_BUFFER);
    while let Some(hit) = scanner.next_hit(population.bodies()) {
        hits.push(hit);
    }
    drain_reports(comm, population, &mut hits, metrics)?;

    hits.sort_unstable();
    hits.dedup();
    for (i, j) in hits {
        let outcome = resolve(population, i, j, rng, split_odds)?;
        metrics.record_outcome(outcome);
    }
    Ok(())
}

/// Receive peer reports into `hits` until every peer has completed.
fn drain_reports<C>(
    comm: &C,
    population: &Population,
    hits: &mut Vec<(usize, usize)>,
    metrics: &mut StepMetrics,
) -> Result<(), SimError>
where
    C: Communicator + ?Sized,
{
    let size = comm.size();
    let capacity = population.capacity();
    let occupied = population.active_count();
    let mut received: SmallVec<[u64; 8]> = smallvec![0; size];
    let mut finished = 1;

    while finished < size {
        let msg = comm.recv_any()?;
        let source = msg.source.0;
        if msg.tag == DONE_TAG {
            if received[source] != msg.value {
                return Err(SimError::Protocol {
                    reason: format!(
                        "rank {source} reported {} collisions but {} arrived",
                        msg.value, received[source]
                    ),
                });
            }
            finished += 1;
            continue;
        }
        if msg.tag != Tag::for_rank(Rank(source)) {
            return Err(SimError::Protocol {
                reason: format!("rank {source} sent a report tagged {}", msg.tag),
            });
        }
        received[source] += 1;
        metrics.reports_received += 1;
        let (i, j) = PairCode(msg.value).decode(capacity);
        if i >= j || j >= occupied {
            return Err(SimError::Protocol {
                reason: format!("rank {source} reported invalid pair ({i}, {j})"),
            });
        }
        hits.push((i, j));
    }
    Ok(())
}

/// Broadcast the coordinator's occupied-slot count, then its body array.
pub fn broadcast_population<C: Communicator + ?Sized>(
    comm: &C,
    population: &mut Population,
) -> Result<(), SimError> {
    if comm.is_coordinator() {
        comm.broadcast(Some(encode_count(population.active_count())))?;
        comm.broadcast(Some(encode_bodies(population.bodies())))?;
        return Ok(());
    }
    let count = decode_count(&comm.broadcast(None)?).map_err(CommError::from)?;
    let bodies = decode_bodies(&comm.broadcast(None)?).map_err(CommError::from)?;
    if bodies.len() != count {
        return Err(SimError::Protocol {
            reason: format!(
                "broadcast announced {count} bodies but carried {}",
                bodies.len()
            ),
        });
    }
    population.replace_all(bodies)
}
