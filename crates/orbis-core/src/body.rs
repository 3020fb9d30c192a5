//! The simulated body record and its kind tag.

use std::fmt;

use crate::vector::Vec3;

/// Closed set of body kinds.
///
/// The discriminants are the values carried on the wire (see the body
/// layout in `orbis-comm`) and must not be renumbered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BodyKind {
    /// A star.
    Sun = 0,
    /// A planet.
    Planet = 1,
    /// A moon orbiting a planet.
    Moon = 2,
    /// An asteroid. Asteroids may split on mutual collision.
    Asteroid = 3,
    /// A comet.
    Comet = 4,
    /// A configured body whose type string was not recognised.
    Unknown = 20,
}

impl BodyKind {
    /// All kinds, in discriminant order.
    pub const ALL: [BodyKind; 6] = [
        Self::Sun,
        Self::Planet,
        Self::Moon,
        Self::Asteroid,
        Self::Comet,
        Self::Unknown,
    ];

    /// Sun, planet or moon: the kinds that absorb small bodies and keep
    /// collision counters.
    pub fn is_large(self) -> bool {
        matches!(self, Self::Sun | Self::Planet | Self::Moon)
    }

    /// Asteroid or comet.
    pub fn is_small(self) -> bool {
        matches!(self, Self::Asteroid | Self::Comet)
    }

    /// The wire tag of this kind.
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Inverse of [`tag()`](Self::tag). Returns `None` for unassigned tags.
    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.tag() == tag)
    }

    /// Map a configuration-file type string to a kind.
    ///
    /// Matching is exact and case-sensitive; anything unrecognised maps to
    /// [`BodyKind::Unknown`].
    pub fn from_config_str(s: &str) -> Self {
        match s {
            "SUN" => Self::Sun,
            "PLANET" => Self::Planet,
            "MOON" => Self::Moon,
            "ASTEROID" => Self::Asteroid,
            "COMET" => Self::Comet,
            _ => Self::Unknown,
        }
    }

    /// Upper-case name as used in configuration files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sun => "SUN",
            Self::Planet => "PLANET",
            Self::Moon => "MOON",
            Self::Asteroid => "ASTEROID",
            Self::Comet => "COMET",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for BodyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One simulated object.
///
/// Every rank holds a full copy of the body array; only the slice a rank
/// owns for the current timestep is written locally, and the coordinator's
/// copy is authoritative after collision resolution.
///
/// `asteroid_hits` and `comet_hits` are only meaningful for large bodies
/// (see [`BodyKind::is_large`]).
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    /// Display name, also the key prefix in the trajectory output.
    pub name: String,
    /// Position in metres.
    pub position: Vec3,
    /// Velocity in m/s.
    pub velocity: Vec3,
    /// Acceleration in m/s² from the most recent force evaluation.
    pub acceleration: Vec3,
    /// Mass in kg.
    pub mass: f64,
    /// Radius in metres.
    pub radius: f64,
    /// Kind tag driving collision dispatch.
    pub kind: BodyKind,
    /// Inactive bodies are logically deleted and skipped everywhere.
    pub active: bool,
    /// Number of asteroids this body has absorbed.
    pub asteroid_hits: u32,
    /// Number of comets this body has absorbed.
    pub comet_hits: u32,
}

impl Body {
    /// Create an active body at rest acceleration with zeroed counters.
    pub fn new(
        name: impl Into<String>,
        kind: BodyKind,
        position: Vec3,
        velocity: Vec3,
        mass: f64,
        radius: f64,
    ) -> Self {
        Self {
            name: name.into(),
            position,
            velocity,
            acceleration: Vec3::ZERO,
            mass,
            radius,
            kind,
            active: true,
            asteroid_hits: 0,
            comet_hits: 0,
        }
    }
}
