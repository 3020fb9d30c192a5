//! Physical constants used by the integrator and the comet spawner.

/// Newtonian gravitational constant, in m³·kg⁻¹·s⁻².
pub const G: f64 = 6.67408e-11;

/// Radius of the simulated domain in metres.
///
/// Spawned comets appear inside this sphere. Roughly the distance to the
/// edge of the solar system.
pub const SOLAR_SYSTEM_RADIUS: f64 = 4.5e12;
