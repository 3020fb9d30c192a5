//! Benchmark profiles for the Orbis n-body simulation.
//!
//! - [`reference_system`]: the Sun, eight planets and both belts
//! - [`clustered_asteroids`]: a tight cloud that produces many overlaps

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use orbis_config::{asteroid_belt, kuiper_belt};
use orbis_core::{Body, BodyKind, Vec3};
use orbis_engine::RunConfig;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const PLANETS: [(&str, f64, f64, f64, f64); 8] = [
    ("MERCURY", 5.79e10, 3.30e23, 2.44e6, 47_400.0),
    ("VENUS", 1.082e11, 4.87e24, 6.05e6, 35_000.0),
    ("EARTH", 1.496e11, 5.97e24, 6.371e6, 29_800.0),
    ("MARS", 2.279e11, 6.42e23, 3.39e6, 24_100.0),
    ("JUPITER", 7.786e11, 1.898e27, 6.99e7, 13_100.0),
    ("SATURN", 1.4335e12, 5.68e26, 5.82e7, 9_700.0),
    ("URANUS", 2.8725e12, 8.68e25, 2.54e7, 6_800.0),
    ("NEPTUNE", 4.4951e12, 1.02e26, 2.46e7, 5_400.0),
];

/// The Sun and eight planets on circular orbits in the x-y plane, with
/// `asteroids` belt asteroids and `kbos` Kuiper belt objects appended.
pub fn reference_system(seed: u64, asteroids: usize, kbos: usize) -> Vec<Body> {
    let mut bodies = Vec::with_capacity(1 + PLANETS.len() + asteroids + kbos);
    bodies.push(Body::new(
        "SUN",
        BodyKind::Sun,
        Vec3::ZERO,
        Vec3::ZERO,
        1.989e30,
        6.96e8,
    ));
    for (name, orbit, mass, radius, speed) in PLANETS {
        bodies.push(Body::new(
            name,
            BodyKind::Planet,
            Vec3::new(orbit, 0.0, 0.0),
            Vec3::new(0.0, speed, 0.0),
            mass,
            radius,
        ));
    }
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let kuiper = kuiper_belt(&mut rng, kbos, bodies.len());
    bodies.extend(kuiper);
    let belt = asteroid_belt(&mut rng, asteroids, bodies.len());
    bodies.extend(belt);
    bodies
}

/// `n` asteroids packed into a cube of side `extent` metres, sized so a
/// fair share of pairs overlap.
pub fn clustered_asteroids(seed: u64, n: usize, extent: f64) -> Vec<Body> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let position = Vec3::new(
                rng.random_range(0.0..extent),
                rng.random_range(0.0..extent),
                rng.random_range(0.0..extent),
            );
            Body::new(
                format!("ROCK{i}"),
                BodyKind::Asteroid,
                position,
                Vec3::ZERO,
                1.0,
                rng.random_range(1.0..10.0),
            )
        })
        .collect()
}

/// A run configuration for benchmarking `timesteps` steps with no
/// history, no progress output and no comets.
pub fn bench_config(timesteps: u64, max_body_size: usize) -> RunConfig {
    RunConfig {
        num_timesteps: timesteps,
        dt: 3600.0,
        display_frequency: 0,
        max_body_size,
        comet_odds: 0,
        ..RunConfig::default()
    }
}
