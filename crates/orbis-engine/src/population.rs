//! The capacity-bounded body array and its growth operations.
//!
//! Slots are append-only: deactivated bodies keep their slot, and new
//! bodies (split fragments, comets) are appended after the last occupied
//! slot. `active_count` is therefore the number of occupied slots, which
//! is the extent every rank partitions, scans and transmits.

use log::debug;
use orbis_core::constants::SOLAR_SYSTEM_RADIUS;
use orbis_core::{Body, BodyKind, SimError, Vec3};
use rand::Rng;

/// Bodies committed by one asteroid split.
pub const SPLIT_FRAGMENTS: usize = 4;

/// Which way a split fragment travels relative to its parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitDirection {
    /// Twice the parent's velocity.
    Forward,
    /// The parent's velocity reversed.
    Reverse,
}

impl SplitDirection {
    /// Velocity and offset multiplier.
    pub fn scale(self) -> f64 {
        match self {
            Self::Forward => 2.0,
            Self::Reverse => -1.0,
        }
    }
}

/// A fragment of `parent`: half its mass and radius, velocity scaled by
/// the direction, and displaced by `scale * 2 * radius` on every axis.
pub fn split_fragment(parent: &Body, direction: SplitDirection, name: String) -> Body {
    let s = direction.scale();
    Body::new(
        name,
        BodyKind::Asteroid,
        parent.position + Vec3::splat(s * parent.radius * 2.0),
        parent.velocity * s,
        parent.mass / 2.0,
        parent.radius / 2.0,
    )
}

/// The simulation's body array.
#[derive(Clone, Debug)]
pub struct Population {
    bodies: Vec<Body>,
    capacity: usize,
    next_asteroid: u64,
    next_comet: u64,
}

impl Population {
    /// Wrap an initial set of bodies in a population of fixed `capacity`.
    ///
    /// Fragment and comet serial numbers continue from the number of
    /// asteroids and comets already present.
    pub fn new(bodies: Vec<Body>, capacity: usize) -> Result<Self, SimError> {
        if bodies.len() > capacity {
            return Err(SimError::CapacityExceeded {
                requested: bodies.len(),
                capacity,
            });
        }
        let count = |kind: BodyKind| bodies.iter().filter(|b| b.kind == kind).count() as u64;
        let next_asteroid = count(BodyKind::Asteroid);
        let next_comet = count(BodyKind::Comet);
        let mut slots = Vec::with_capacity(capacity);
        slots.extend(bodies);
        Ok(Self {
            bodies: slots,
            capacity,
            next_asteroid,
            next_comet,
        })
    }

    /// All occupied slots.
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Mutable access to all occupied slots.
    pub fn bodies_mut(&mut self) -> &mut [Body] {
        &mut self.bodies
    }

    /// Number of occupied slots.
    pub fn active_count(&self) -> usize {
        self.bodies.len()
    }

    /// Number of bodies whose `active` flag is set.
    pub fn live_count(&self) -> usize {
        self.bodies.iter().filter(|b| b.active).count()
    }

    /// The fixed capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Fail unless `additional` more slots fit.
    pub fn ensure_capacity(&self, additional: usize) -> Result<(), SimError> {
        let requested = self.bodies.len() + additional;
        if requested > self.capacity {
            return Err(SimError::CapacityExceeded {
                requested,
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    /// Replace every slot with `bodies`, as received from the coordinator.
    pub fn replace_all(&mut self, bodies: Vec<Body>) -> Result<(), SimError> {
        if bodies.len() > self.capacity {
            return Err(SimError::CapacityExceeded {
                requested: bodies.len(),
                capacity: self.capacity,
            });
        }
        self.bodies.clear();
        self.bodies.extend(bodies);
        Ok(())
    }

    /// Overwrite the slots starting at `offset` with `bodies`.
    pub fn overwrite(&mut self, offset: usize, bodies: Vec<Body>) -> Result<(), SimError> {
        let end = offset + bodies.len();
        if end > self.bodies.len() {
            return Err(SimError::Protocol {
                reason: format!(
                    "slots {offset}..{end} lie beyond the {} occupied slots",
                    self.bodies.len()
                ),
            });
        }
        for (slot, body) in self.bodies[offset..end].iter_mut().zip(bodies) {
            *slot = body;
        }
        Ok(())
    }

    fn next_fragment_name(&mut self) -> String {
        let name = format!("ASTEROID{}", self.next_asteroid);
        self.next_asteroid += 1;
        name
    }

    /// Deactivate asteroids `i` and `j` and append two fragments of each.
    ///
    /// Fragments are appended in the order `i` forward, `i` reverse, `j`
    /// forward, `j` reverse. Returns the fragments' slots.
    pub fn split(&mut self, i: usize, j: usize) -> Result<[usize; SPLIT_FRAGMENTS], SimError> {
        self.ensure_capacity(SPLIT_FRAGMENTS)?;
        let first = self.bodies.len();
        for parent in [i, j] {
            self.bodies[parent].active = false;
            for direction in [SplitDirection::Forward, SplitDirection::Reverse] {
                let name = self.next_fragment_name();
                let fragment = split_fragment(&self.bodies[parent], direction, name);
                self.bodies.push(fragment);
            }
        }
        debug!(
            "split {} and {} into slots {first}..{}",
            self.bodies[i].name,
            self.bodies[j].name,
            first + SPLIT_FRAGMENTS
        );
        Ok([first, first + 1, first + 2, first + 3])
    }

    /// With probability `1 / odds`, append a comet at the edge of the
    /// solar system heading for the origin. `odds == 0` never spawns.
    ///
    /// Returns the new comet's slot.
    pub fn spawn_comet<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        odds: u32,
    ) -> Result<Option<usize>, SimError> {
        if odds == 0 || rng.random_range(0..odds) != 0 {
            return Ok(None);
        }
        self.ensure_capacity(1)?;

        let r = SOLAR_SYSTEM_RADIUS;
        let x = rng.random_range(0.0..=r);
        let y = rng.random_range(0.0..=(r * r - x * x).max(0.0).sqrt());
        // z completes the point onto the sphere of radius r.
        let z = (r * r - x * x - y * y).max(0.0).sqrt();
        let position = Vec3::new(x, y, z);

        let speed = rng.random_range(1000.0..=40_000.0);
        let distance = position.norm();
        let velocity = if distance > 0.0 {
            position * (-speed / distance)
        } else {
            Vec3::ZERO
        };
        let mass = rng.random_range(1e10..=9e14);
        let radius = rng.random_range(2.0..=6.0);

        let name = format!("COMET{}", self.next_comet);
        self.next_comet += 1;
        let slot = self.bodies.len();
        debug!("comet {name} enters at slot {slot}");
        self.bodies
            .push(Body::new(name, BodyKind::Comet, position, velocity, mass, radius));
        Ok(Some(slot))
    }
}
