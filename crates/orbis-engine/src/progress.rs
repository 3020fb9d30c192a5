//! Human-readable progress and end-of-run reports.

use std::time::Duration;

use log::info;
use orbis_core::Body;

const SECONDS_PER_YEAR: u64 = 31_536_000;
const SECONDS_PER_DAY: u64 = 86_400;
const SECONDS_PER_HOUR: u64 = 3_600;
const SECONDS_PER_MINUTE: u64 = 60;

/// Format a model-time span as years, days, hours, minutes and seconds.
pub fn model_time(seconds: u64) -> String {
    let years = seconds / SECONDS_PER_YEAR;
    let mut rem = seconds % SECONDS_PER_YEAR;
    let days = rem / SECONDS_PER_DAY;
    rem %= SECONDS_PER_DAY;
    let hours = rem / SECONDS_PER_HOUR;
    rem %= SECONDS_PER_HOUR;
    let mins = rem / SECONDS_PER_MINUTE;
    let secs = rem % SECONDS_PER_MINUTE;
    format!("{years} years, {days} days, {hours} hours, {mins} min and {secs} secs")
}

/// Model seconds elapsed after `timesteps` steps of `dt`.
pub fn model_seconds(timesteps: u64, dt: f64) -> u64 {
    (timesteps as f64 * dt).max(0.0) as u64
}

/// Asteroid and comet hits summed over every sun, planet and moon.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollisionTally {
    /// Asteroids absorbed.
    pub asteroids: u64,
    /// Comets absorbed.
    pub comets: u64,
}

impl CollisionTally {
    /// Sum the counters of every large body.
    pub fn from_bodies(bodies: &[Body]) -> Self {
        bodies
            .iter()
            .filter(|b| b.kind.is_large())
            .fold(Self::default(), |t, b| Self {
                asteroids: t.asteroids + u64::from(b.asteroid_hits),
                comets: t.comets + u64::from(b.comet_hits),
            })
    }
}

fn log_large_bodies(bodies: &[Body]) {
    for b in bodies.iter().filter(|b| b.kind.is_large()) {
        info!(
            "For {}, number of collisions with asteroids: {}, with comets: {}",
            b.name, b.asteroid_hits, b.comet_hits
        );
    }
}

/// Log a periodic progress line and every large body's counters.
pub fn report_progress(timestep: u64, dt: f64, runtime: Duration, bodies: &[Body]) {
    info!(
        "Timestep: {timestep}, model time is {}, current runtime is {:.2} seconds, {} bodies studied",
        model_time(model_seconds(timestep, dt)),
        runtime.as_secs_f64(),
        bodies.len()
    );
    log_large_bodies(bodies);
}

/// Log the end-of-run report and return the collision totals.
pub fn report_summary(
    num_timesteps: u64,
    dt: f64,
    runtime: Duration,
    bodies: &[Body],
) -> CollisionTally {
    let time = model_time(model_seconds(num_timesteps, dt));
    log_large_bodies(bodies);
    let tally = CollisionTally::from_bodies(bodies);
    info!(
        "Model completed after {num_timesteps} timesteps, total model time: {time}, total runtime: {:.2} seconds",
        runtime.as_secs_f64()
    );
    info!(
        "Total sum of collisions with the sun, planets and moons: asteroids: {}, comets: {}",
        tally.asteroids, tally.comets
    );
    tally
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbis_core::Vec3;
    use orbis_test_utils::{asteroid, moon, planet};

    #[test]
    fn model_time_breaks_down_units() {
        assert_eq!(
            model_time(0),
            "0 years, 0 days, 0 hours, 0 min and 0 secs"
        );
        let s = SECONDS_PER_YEAR + 2 * SECONDS_PER_DAY + 3 * SECONDS_PER_HOUR + 4 * 60 + 5;
        assert_eq!(
            model_time(s),
            "1 years, 2 days, 3 hours, 4 min and 5 secs"
        );
    }

    #[test]
    fn model_seconds_scales_by_dt() {
        assert_eq!(model_seconds(1000, 3600.0), 3_600_000);
        assert_eq!(model_seconds(3, 0.5), 1);
    }

    #[test]
    fn tally_counts_only_large_bodies() {
        let mut p = planet("P", Vec3::ZERO, 1.0);
        p.asteroid_hits = 2;
        p.comet_hits = 1;
        let mut m = moon("M", Vec3::ZERO, 1.0);
        m.asteroid_hits = 3;
        let mut a = asteroid("A", Vec3::ZERO, 1.0);
        a.asteroid_hits = 100;
        let tally = CollisionTally::from_bodies(&[p, m, a]);
        assert_eq!(tally, CollisionTally { asteroids: 5, comets: 1 });
    }
}
