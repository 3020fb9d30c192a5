//! Collision rules, selected by the kinds of the two bodies.
//!
//! Resolution runs only on the coordinator. It is a no-op for any pair
//! where either body is already inactive, so a report that arrives after
//! one of its bodies was consumed by an earlier collision is harmless.

use log::debug;
use orbis_core::{Body, BodyKind, SimError, Vec3};
use rand::Rng;

use crate::population::{Population, SPLIT_FRAGMENTS};

/// One body of a colliding pair, by position in the pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// The first body of the pair.
    First,
    /// The second body of the pair.
    Second,
}

impl Side {
    fn pick(self, first: usize, second: usize) -> (usize, usize) {
        match self {
            Self::First => (first, second),
            Self::Second => (second, first),
        }
    }
}

/// What happens when two kinds of body collide.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollisionRule {
    /// Two asteroids either split into four fragments or bounce.
    AsteroidAsteroid,
    /// A sun, planet or moon absorbs an asteroid or comet.
    Absorb {
        /// Which side is the large body.
        large: Side,
    },
    /// Two comets destroy each other.
    CometComet,
    /// The asteroid bounces off the comet; the comet is destroyed.
    AsteroidComet {
        /// Which side is the asteroid.
        asteroid: Side,
    },
    /// No rule applies, e.g. planet and sun, or unknown kinds.
    Ignore,
}

impl CollisionRule {
    /// The rule for a pair of kinds. The lookup is symmetric: swapping
    /// the kinds swaps the sides in the result.
    pub fn lookup(a: BodyKind, b: BodyKind) -> Self {
        use BodyKind::{Asteroid, Comet};
        match (a, b) {
            (Asteroid, Asteroid) => Self::AsteroidAsteroid,
            (Comet, Comet) => Self::CometComet,
            (Asteroid, Comet) => Self::AsteroidComet {
                asteroid: Side::First,
            },
            (Comet, Asteroid) => Self::AsteroidComet {
                asteroid: Side::Second,
            },
            (a, b) if a.is_large() && b.is_small() => Self::Absorb { large: Side::First },
            (a, b) if a.is_small() && b.is_large() => Self::Absorb {
                large: Side::Second,
            },
            _ => Self::Ignore,
        }
    }
}

/// The effect a resolution had.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// One of the bodies was already inactive.
    Skipped,
    /// No rule applies to this pair of kinds.
    Ignored,
    /// Two asteroids exchanged momentum.
    Bounced,
    /// Two asteroids were replaced by four fragments.
    Split {
        /// Slots of the new fragments.
        fragments: [usize; SPLIT_FRAGMENTS],
    },
    /// A large body absorbed a small one.
    Absorbed {
        /// Slot of the absorbing body.
        large: usize,
        /// Slot of the absorbed body.
        small: usize,
    },
    /// Two comets destroyed each other.
    Annihilated,
    /// An asteroid deflected and destroyed a comet.
    Deflected {
        /// Slot of the surviving asteroid.
        asteroid: usize,
    },
}

/// Post-collision velocities of an elastic collision between `a` and
/// `b`, both computed from the pre-collision state.
///
/// `v_k' = v_k - (2 m_other / M) (Δv·Δp / |Δp|²) Δp`, with `Δp` and `Δv`
/// taken from body `k` towards the other. Coincident centres leave both
/// velocities unchanged.
pub fn elastic_velocities(a: &Body, b: &Body) -> (Vec3, Vec3) {
    let dp = a.position - b.position;
    let dv = a.velocity - b.velocity;
    let d = dp.norm_squared();
    if d == 0.0 {
        return (a.velocity, b.velocity);
    }
    let ratio = dv.dot(dp) / d;
    let total = a.mass + b.mass;
    let va = a.velocity - dp * (2.0 * b.mass / total * ratio);
    let vb = b.velocity + dp * (2.0 * a.mass / total * ratio);
    (va, vb)
}

fn pair_mut(bodies: &mut [Body], i: usize, j: usize) -> (&mut Body, &mut Body) {
    if i < j {
        let (lo, hi) = bodies.split_at_mut(j);
        (&mut lo[i], &mut hi[0])
    } else {
        let (lo, hi) = bodies.split_at_mut(i);
        (&mut hi[0], &mut lo[j])
    }
}

/// Apply the collision rule to slots `i` and `j`.
///
/// `split_odds` gives the 1-in-N chance that colliding asteroids split.
///
/// # Errors
///
/// [`SimError::Protocol`] if the slots are equal or unoccupied, and
/// [`SimError::CapacityExceeded`] if a split has no room.
pub fn resolve<R: Rng + ?Sized>(
    population: &mut Population,
    i: usize,
    j: usize,
    rng: &mut R,
    split_odds: u32,
) -> Result<Outcome, SimError> {
    let occupied = population.active_count();
    if i == j || i >= occupied || j >= occupied {
        return Err(SimError::Protocol {
            reason: format!("invalid collision pair ({i}, {j}) over {occupied} slots"),
        });
    }
    let bodies = population.bodies_mut();
    if !bodies[i].active || !bodies[j].active {
        return Ok(Outcome::Skipped);
    }
    debug!("collision between {} and {}", bodies[i].name, bodies[j].name);

    let outcome = match CollisionRule::lookup(bodies[i].kind, bodies[j].kind) {
        CollisionRule::AsteroidAsteroid => {
            if rng.random_range(0..split_odds) == 0 {
                let fragments = population.split(i, j)?;
                Outcome::Split { fragments }
            } else {
                let (a, b) = pair_mut(bodies, i, j);
                let (va, vb) = elastic_velocities(a, b);
                a.velocity = va;
                b.velocity = vb;
                Outcome::Bounced
            }
        }
        CollisionRule::Absorb { large } => {
            let (large, small) = large.pick(i, j);
            let (big, absorbed) = pair_mut(bodies, large, small);
            big.mass += absorbed.mass;
            match absorbed.kind {
                BodyKind::Comet => big.comet_hits += 1,
                _ => big.asteroid_hits += 1,
            }
            absorbed.active = false;
            Outcome::Absorbed { large, small }
        }
        CollisionRule::CometComet => {
            bodies[i].active = false;
            bodies[j].active = false;
            Outcome::Annihilated
        }
        CollisionRule::AsteroidComet { asteroid } => {
            let (asteroid, comet) = asteroid.pick(i, j);
            let (rock, ice) = pair_mut(bodies, asteroid, comet);
            rock.velocity = elastic_velocities(rock, ice).0;
            ice.active = false;
            Outcome::Deflected { asteroid }
        }
        CollisionRule::Ignore => Outcome::Ignored,
    };
    debug!("resolved ({i}, {j}): {outcome:?}");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbis_test_utils::{asteroid, comet, moon, planet, sun};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(8759)
    }

    #[test]
    fn lookup_is_symmetric() {
        for a in BodyKind::ALL {
            for b in BodyKind::ALL {
                let forward = CollisionRule::lookup(a, b);
                let mirrored = match CollisionRule::lookup(b, a) {
                    CollisionRule::Absorb { large } => CollisionRule::Absorb {
                        large: flip(large),
                    },
                    CollisionRule::AsteroidComet { asteroid } => CollisionRule::AsteroidComet {
                        asteroid: flip(asteroid),
                    },
                    other => other,
                };
                assert_eq!(forward, mirrored, "{a} vs {b}");
            }
        }
    }

    fn flip(side: Side) -> Side {
        match side {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }

    #[test]
    fn large_bodies_absorb_regardless_of_order() {
        assert_eq!(
            CollisionRule::lookup(BodyKind::Planet, BodyKind::Comet),
            CollisionRule::Absorb { large: Side::First }
        );
        assert_eq!(
            CollisionRule::lookup(BodyKind::Asteroid, BodyKind::Sun),
            CollisionRule::Absorb {
                large: Side::Second
            }
        );
        assert_eq!(
            CollisionRule::lookup(BodyKind::Planet, BodyKind::Sun),
            CollisionRule::Ignore
        );
        assert_eq!(
            CollisionRule::lookup(BodyKind::Unknown, BodyKind::Asteroid),
            CollisionRule::Ignore
        );
    }

    #[test]
    fn planet_absorbs_asteroid() {
        let p = planet("EARTH", Vec3::ZERO, 10.0);
        let a = asteroid("ROCK", Vec3::new(1.0, 0.0, 0.0), 1.0);
        let expected_mass = p.mass + a.mass;
        let mut pop = Population::new(vec![a, p], 10).unwrap();

        let outcome = resolve(&mut pop, 0, 1, &mut rng(), 10).unwrap();
        assert_eq!(outcome, Outcome::Absorbed { large: 1, small: 0 });
        let b = pop.bodies();
        assert_eq!(b[1].mass, expected_mass);
        assert_eq!(b[1].asteroid_hits, 1);
        assert_eq!(b[1].comet_hits, 0);
        assert!(!b[0].active);
    }

    #[test]
    fn moon_absorbs_comet() {
        let m = moon("LUNA", Vec3::ZERO, 10.0);
        let c = comet("C", Vec3::ZERO, 1.0);
        let mut pop = Population::new(vec![m, c], 10).unwrap();
        resolve(&mut pop, 0, 1, &mut rng(), 10).unwrap();
        assert_eq!(pop.bodies()[0].comet_hits, 1);
        assert_eq!(pop.bodies()[0].asteroid_hits, 0);
        assert!(!pop.bodies()[1].active);
    }

    #[test]
    fn comets_annihilate() {
        let mut pop = Population::new(
            vec![comet("A", Vec3::ZERO, 1.0), comet("B", Vec3::ZERO, 1.0)],
            10,
        )
        .unwrap();
        assert_eq!(
            resolve(&mut pop, 0, 1, &mut rng(), 10).unwrap(),
            Outcome::Annihilated
        );
        assert_eq!(pop.live_count(), 0);
    }

    #[test]
    fn asteroid_deflects_comet() {
        let mut c = comet("C", Vec3::ZERO, 1.0);
        c.velocity = Vec3::new(1.0, 0.0, 0.0);
        let a = asteroid("A", Vec3::new(1.0, 0.0, 0.0), 1.0);
        let (va, _) = elastic_velocities(&a, &c);
        let mut pop = Population::new(vec![c, a], 10).unwrap();

        let outcome = resolve(&mut pop, 0, 1, &mut rng(), 10).unwrap();
        assert_eq!(outcome, Outcome::Deflected { asteroid: 1 });
        assert!(!pop.bodies()[0].active);
        assert_eq!(pop.bodies()[1].velocity, va);
    }

    #[test]
    fn inactive_pairs_are_skipped() {
        let mut a = asteroid("A", Vec3::ZERO, 1.0);
        a.active = false;
        let s = sun("SOL", Vec3::ZERO, 1.0);
        let mass = s.mass;
        let mut pop = Population::new(vec![a, s], 10).unwrap();
        assert_eq!(
            resolve(&mut pop, 0, 1, &mut rng(), 10).unwrap(),
            Outcome::Skipped
        );
        assert_eq!(pop.bodies()[1].mass, mass);
    }

    #[test]
    fn invalid_pairs_are_protocol_errors() {
        let mut pop = Population::new(vec![asteroid("A", Vec3::ZERO, 1.0)], 10).unwrap();
        assert!(matches!(
            resolve(&mut pop, 0, 0, &mut rng(), 10),
            Err(SimError::Protocol { .. })
        ));
        assert!(matches!(
            resolve(&mut pop, 0, 4, &mut rng(), 10),
            Err(SimError::Protocol { .. })
        ));
    }

    #[test]
    fn certain_split_replaces_both_asteroids() {
        let a = asteroid("A", Vec3::ZERO, 2.0);
        let b = asteroid("B", Vec3::new(1.0, 0.0, 0.0), 2.0);
        let mut pop = Population::new(vec![a, b], 10).unwrap();
        let outcome = resolve(&mut pop, 0, 1, &mut rng(), 1).unwrap();
        assert_eq!(
            outcome,
            Outcome::Split {
                fragments: [2, 3, 4, 5]
            }
        );
        assert_eq!(pop.live_count(), 4);
    }

    #[test]
    fn unsplit_asteroids_bounce_elastically() {
        let mut a = asteroid("A", Vec3::ZERO, 2.0);
        a.velocity = Vec3::new(1.0, 0.0, 0.0);
        let mut b = asteroid("B", Vec3::new(1.0, 0.0, 0.0), 2.0);
        b.velocity = Vec3::new(-1.0, 0.0, 0.0);
        let mut pop = Population::new(vec![a, b], 10).unwrap();

        // Odds of u32::MAX make a split vanishingly unlikely for one draw.
        let outcome = resolve(&mut pop, 0, 1, &mut rng(), u32::MAX).unwrap();
        assert_eq!(outcome, Outcome::Bounced);
        // Equal masses head-on exchange velocities.
        assert_eq!(pop.bodies()[0].velocity, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(pop.bodies()[1].velocity, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn elastic_update_conserves_momentum_and_energy() {
        let mut a = asteroid("A", Vec3::new(0.0, 0.0, 0.0), 1.0);
        a.mass = 3.0;
        a.velocity = Vec3::new(2.0, 1.0, -1.0);
        let mut b = asteroid("B", Vec3::new(1.0, 1.0, 0.5), 1.0);
        b.mass = 5.0;
        b.velocity = Vec3::new(-1.0, 0.5, 0.0);
        let (va, vb) = elastic_velocities(&a, &b);

        let p0 = a.velocity * a.mass + b.velocity * b.mass;
        let p1 = va * a.mass + vb * b.mass;
        assert!((p0 - p1).norm() < 1e-12);
        let e0 = a.mass * a.velocity.norm_squared() + b.mass * b.velocity.norm_squared();
        let e1 = a.mass * va.norm_squared() + b.mass * vb.norm_squared();
        assert!((e0 - e1).abs() < 1e-12);
    }
}
