//! Newtonian gravity and explicit Euler integration.
//!
//! Reads span the whole body array; writes are confined to the caller's
//! partition. Near-zero separations are not softened and can produce
//! very large accelerations.

use orbis_core::constants::G;
use orbis_core::{Body, Vec3};

use crate::partition::PartitionRange;

/// Acceleration that `acting` imposes on `acted`.
pub fn two_body_acceleration(acted: &Body, acting: &Body) -> Vec3 {
    let offset = acting.position - acted.position;
    let r = offset.norm();
    offset * (G * acting.mass / (r * r * r))
}

/// Total acceleration on slot `index` from every other active body.
pub fn net_acceleration(bodies: &[Body], index: usize) -> Vec3 {
    let target = &bodies[index];
    let mut acceleration = Vec3::ZERO;
    for (other_index, other) in bodies.iter().enumerate() {
        if other_index != index && other.active {
            acceleration += two_body_acceleration(target, other);
        }
    }
    acceleration
}

/// Recompute acceleration and advance velocity for every active body in
/// `range`.
pub fn compute_velocities(bodies: &mut [Body], range: PartitionRange, dt: f64) {
    for i in range.slots() {
        if !bodies[i].active {
            continue;
        }
        let acceleration = net_acceleration(bodies, i);
        let body = &mut bodies[i];
        body.acceleration = acceleration;
        body.velocity += acceleration * dt;
    }
}

/// Advance position for every active body in `range`.
pub fn update_positions(bodies: &mut [Body], range: PartitionRange, dt: f64) {
    for body in &mut bodies[range.slots()] {
        if body.active {
            body.position += body.velocity * dt;
        }
    }
}
