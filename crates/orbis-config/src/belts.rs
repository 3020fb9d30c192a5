//! Procedural asteroid-belt and Kuiper-belt generation.
//!
//! Bodies are laid out along x in equal increments from `-max` to `max`,
//! with y drawn so the body falls inside the belt's annulus around the
//! origin. Every generated body is an active [`BodyKind::Asteroid`] moving
//! at 45 km/s along +y.

use orbis_core::{Body, BodyKind, Vec3};
use rand::Rng;

use crate::parse::SimulationFile;

const BELT_VELOCITY: Vec3 = Vec3::new(0.0, 45_000.0, 0.0);

/// The four largest main-belt asteroids: name, mass (kg), radius (m).
const NAMED_ASTEROIDS: [(&str, f64, f64); 4] = [
    ("CERES", 9.3835e20, 469_730.0),
    ("VESTA", 2.59076e20, 262_700.0),
    ("PALLAS", 2.04e20, 259_500.0),
    ("HYGIEA", 8.74e19, 433_000.0),
];

// Asteroid belt band, kept clear of Mars and Jupiter.
const ASTEROID_MIN_DISTANCE: f64 = 206_620e6 - 3_389_500.0;
const ASTEROID_MAX_DISTANCE: f64 = 740_520e6 - 71_492_000.0;
const ASTEROID_MIN_RADIUS: f64 = 1000.0;
const ASTEROID_MAX_RADIUS: f64 = 259_500.0;

const KUIPER_MIN_DISTANCE: f64 = 444_445e7 + 24_341_000.0;
const KUIPER_MAX_DISTANCE: f64 = 7.1e12;
const KUIPER_MIN_RADIUS: f64 = 100e3;
const KUIPER_MAX_RADIUS: f64 = 750e3;
// Density bounds in kg/m³, applied to radius³.
const KUIPER_MIN_DENSITY: f64 = 1e4;
const KUIPER_MAX_DENSITY: f64 = 1e5;

/// Minimum asteroid-belt size: the four named asteroids.
pub const MIN_ASTEROID_BELT: usize = NAMED_ASTEROIDS.len();

/// Uniform draw over `[low, high]`.
fn uniform<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    low + rng.random::<f64>() * (high - low)
}

/// Position at `x` inside the annulus `[min, max]`, on a random side of
/// the x axis.
fn annulus_position<R: Rng + ?Sized>(rng: &mut R, x: f64, min: f64, max: f64) -> Vec3 {
    let outer = (max * max - x * x).max(0.0).sqrt();
    let mut y = if x.abs() > min {
        uniform(rng, 0.0, outer)
    } else {
        uniform(rng, (min * min - x * x).sqrt(), outer)
    };
    if rng.random_bool(0.5) {
        y = -y;
    }
    Vec3::new(x, y, 0.0)
}

/// Generate a Kuiper belt of `count` bodies named `KBO<slot>`, where
/// slots start at `first_slot`.
pub fn kuiper_belt<R: Rng + ?Sized>(rng: &mut R, count: usize, first_slot: usize) -> Vec<Body> {
    if count == 0 {
        return Vec::new();
    }
    let increment = KUIPER_MAX_DISTANCE * 2.0 / count as f64;
    (0..count)
        .map(|i| {
            let radius = uniform(rng, KUIPER_MIN_RADIUS, KUIPER_MAX_RADIUS);
            let mass = uniform(rng, KUIPER_MIN_DENSITY, KUIPER_MAX_DENSITY) * radius.powi(3);
            let x = -KUIPER_MAX_DISTANCE + increment * i as f64;
            let position = annulus_position(rng, x, KUIPER_MIN_DISTANCE, KUIPER_MAX_DISTANCE);
            Body::new(
                format!("KBO{}", first_slot + i),
                BodyKind::Asteroid,
                position,
                BELT_VELOCITY,
                mass,
                radius,
            )
        })
        .collect()
}

/// Generate an asteroid belt of `count` bodies.
///
/// The first four are CERES, VESTA, PALLAS and HYGIEA; the rest are named
/// `BODY<slot>` with masses proportional to their radius so that, on
/// average, they share the named asteroids' total mass. Returns nothing
/// when `count` is below [`MIN_ASTEROID_BELT`].
pub fn asteroid_belt<R: Rng + ?Sized>(rng: &mut R, count: usize, first_slot: usize) -> Vec<Body> {
    if count < MIN_ASTEROID_BELT {
        return Vec::new();
    }
    let named_mass: f64 = NAMED_ASTEROIDS.iter().map(|&(_, mass, _)| mass).sum();
    let average_mass = named_mass / count as f64;
    let average_radius = (ASTEROID_MIN_RADIUS + ASTEROID_MAX_RADIUS) / 2.0;
    let increment = ASTEROID_MAX_DISTANCE * 2.0 / count as f64;

    let mut bodies = Vec::with_capacity(count);
    for i in 0..count {
        let (name, mass, radius) = match NAMED_ASTEROIDS.get(i) {
            Some(&(name, mass, radius)) => (name.to_string(), mass, radius),
            None => {
                let radius = uniform(rng, ASTEROID_MIN_RADIUS, ASTEROID_MAX_RADIUS);
                let mass = average_mass * radius / average_radius;
                (format!("BODY{}", first_slot + i), mass, radius)
            }
        };
        let x = -ASTEROID_MAX_DISTANCE + increment * i as f64;
        let position = annulus_position(rng, x, ASTEROID_MIN_DISTANCE, ASTEROID_MAX_DISTANCE);
        bodies.push(Body::new(
            name,
            BodyKind::Asteroid,
            position,
            BELT_VELOCITY,
            mass,
            radius,
        ));
    }
    bodies
}

/// Append the Kuiper belt and then the asteroid belt to `file.bodies`.
pub fn append_belts<R: Rng + ?Sized>(file: &mut SimulationFile, rng: &mut R) {
    let kuiper = kuiper_belt(rng, file.kuiper_belt, file.bodies.len());
    file.bodies.extend(kuiper);
    let asteroids = asteroid_belt(rng, file.asteroid_belt, file.bodies.len());
    file.bodies.extend(asteroids);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(8759)
    }

    #[test]
    fn small_asteroid_belt_is_skipped() {
        assert!(asteroid_belt(&mut rng(), 3, 0).is_empty());
    }

    #[test]
    fn asteroid_belt_starts_with_named_bodies() {
        let belt = asteroid_belt(&mut rng(), 6, 10);
        let names: Vec<_> = belt.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["CERES", "VESTA", "PALLAS", "HYGIEA", "BODY14", "BODY15"]);
        assert_eq!(belt[0].mass, 9.3835e20);
        assert!(belt.iter().all(|b| b.kind == BodyKind::Asteroid && b.active));
        assert!(belt.iter().all(|b| b.velocity == BELT_VELOCITY));
    }

    #[test]
    fn generated_radii_stay_in_band() {
        let belt = asteroid_belt(&mut rng(), 50, 0);
        for b in &belt[MIN_ASTEROID_BELT..] {
            assert!((ASTEROID_MIN_RADIUS..=ASTEROID_MAX_RADIUS).contains(&b.radius));
        }
        for b in kuiper_belt(&mut rng(), 50, 0) {
            assert!((KUIPER_MIN_RADIUS..=KUIPER_MAX_RADIUS).contains(&b.radius));
            let density = b.mass / b.radius.powi(3);
            assert!((KUIPER_MIN_DENSITY..=KUIPER_MAX_DENSITY * 1.000_001).contains(&density));
        }
    }

    #[test]
    fn append_orders_kuiper_before_asteroids() {
        let mut file = SimulationFile {
            asteroid_belt: 4,
            kuiper_belt: 2,
            ..SimulationFile::default()
        };
        append_belts(&mut file, &mut rng());
        let names: Vec<_> = file.bodies.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["KBO0", "KBO1", "CERES", "VESTA", "PALLAS", "HYGIEA"]);
    }

    proptest! {
        #[test]
        fn belt_bodies_lie_within_outer_edge(count in 4usize..64, seed in any::<u64>()) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            for b in asteroid_belt(&mut rng, count, 0) {
                prop_assert!(b.position.norm() <= ASTEROID_MAX_DISTANCE * (1.0 + 1e-9));
                prop_assert_eq!(b.position.z, 0.0);
            }
            for b in kuiper_belt(&mut rng, count, 0) {
                prop_assert!(b.position.norm() <= KUIPER_MAX_DISTANCE * (1.0 + 1e-9));
            }
        }
    }
}
