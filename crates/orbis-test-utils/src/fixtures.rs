//! Body fixtures.
//!
//! Each constructor places an active body at rest with a mass typical
//! of its kind. Tests override fields directly where they matter.

use orbis_core::{Body, BodyKind, Vec3};

pub const SUN_MASS: f64 = 1.989e30;
pub const PLANET_MASS: f64 = 5.97e24;
pub const MOON_MASS: f64 = 7.35e22;
pub const ASTEROID_MASS: f64 = 1e15;
pub const COMET_MASS: f64 = 1e12;

fn at_rest(name: &str, kind: BodyKind, position: Vec3, mass: f64, radius: f64) -> Body {
    Body::new(name, kind, position, Vec3::ZERO, mass, radius)
}

pub fn sun(name: &str, position: Vec3, radius: f64) -> Body {
    at_rest(name, BodyKind::Sun, position, SUN_MASS, radius)
}

pub fn planet(name: &str, position: Vec3, radius: f64) -> Body {
    at_rest(name, BodyKind::Planet, position, PLANET_MASS, radius)
}

pub fn moon(name: &str, position: Vec3, radius: f64) -> Body {
    at_rest(name, BodyKind::Moon, position, MOON_MASS, radius)
}

pub fn asteroid(name: &str, position: Vec3, radius: f64) -> Body {
    at_rest(name, BodyKind::Asteroid, position, ASTEROID_MASS, radius)
}

pub fn comet(name: &str, position: Vec3, radius: f64) -> Body {
    at_rest(name, BodyKind::Comet, position, COMET_MASS, radius)
}
