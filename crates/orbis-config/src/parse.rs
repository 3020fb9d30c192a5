//! Line-oriented `KEY=VALUE` configuration parser.
//!
//! ```text
//! # comment
//! NUM_TIMESTEPS=5000
//! DT=100
//! BODY_0_NAME=SUN
//! BODY_0_MASS=1.989e30
//! BODY_0_TYPE=SUN
//! ```
//!
//! Body keys take the form `BODY_<n>_<FIELD>`. Bodies are materialised in
//! ascending `n` order with gaps dropped, so `BODY_0` and `BODY_7` become
//! slots 0 and 1.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;
use log::{info, warn};
use orbis_core::{Body, BodyKind, Vec3};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::belts::{append_belts, MIN_ASTEROID_BELT};
use crate::error::ConfigError;

/// Body capacity used when none is given on the command line.
pub const DEFAULT_MAX_BODY_SIZE: usize = 100;

/// Fewer free slots than this after loading triggers a warning.
const HEADROOM_WARNING: usize = 50;

/// A parsed configuration file.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationFile {
    /// Number of timesteps to run. Default: 1000.
    pub num_timesteps: u64,
    /// Timestep length in seconds. Default: 1.0.
    pub dt: f64,
    /// Record history every this many timesteps. Default: 10.
    pub output_frequency: u64,
    /// Log progress every this many timesteps. Default: 10000.
    pub display_frequency: u64,
    /// Number of generated asteroid-belt bodies. Default: 0.
    pub asteroid_belt: usize,
    /// Number of generated Kuiper-belt bodies. Default: 0.
    pub kuiper_belt: usize,
    /// Explicitly configured bodies, followed by generated belt bodies
    /// once [`append_belts`] has run.
    pub bodies: Vec<Body>,
}

impl Default for SimulationFile {
    fn default() -> Self {
        Self {
            num_timesteps: 1000,
            dt: 1.0,
            output_frequency: 10,
            display_frequency: 10_000,
            asteroid_belt: 0,
            kuiper_belt: 0,
            bodies: Vec::new(),
        }
    }
}

impl SimulationFile {
    /// Asteroid-belt bodies that will actually be generated. A belt
    /// smaller than [`MIN_ASTEROID_BELT`] is dropped.
    pub fn generated_asteroid_belt(&self) -> usize {
        if self.asteroid_belt < MIN_ASTEROID_BELT {
            0
        } else {
            self.asteroid_belt
        }
    }

    /// Body slots this configuration occupies once its belts are generated.
    pub fn required_slots(&self) -> usize {
        self.bodies.len() + self.generated_asteroid_belt() + self.kuiper_belt
    }
}

// ── Body keys ──────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BodyKey {
    Name,
    PositionX,
    PositionY,
    PositionZ,
    Mass,
    Radius,
    VelocityX,
    VelocityY,
    VelocityZ,
    Type,
}

impl BodyKey {
    fn from_field(field: &str) -> Option<Self> {
        Some(match field {
            "NAME" => Self::Name,
            "POSITION_X" => Self::PositionX,
            "POSITION_Y" => Self::PositionY,
            "POSITION_Z" => Self::PositionZ,
            "MASS" => Self::Mass,
            "RADIUS" => Self::Radius,
            "VELOCITY_X" => Self::VelocityX,
            "VELOCITY_Y" => Self::VelocityY,
            "VELOCITY_Z" => Self::VelocityZ,
            "TYPE" => Self::Type,
            _ => return None,
        })
    }
}

#[derive(Clone, Debug, Default)]
struct BodySpec {
    name: Option<String>,
    position: Vec3,
    velocity: Vec3,
    mass: f64,
    radius: f64,
    kind: Option<BodyKind>,
}

impl BodySpec {
    fn apply(&mut self, key: &str, field: BodyKey, value: &str) -> Result<(), ConfigError> {
        match field {
            BodyKey::Name => self.name = Some(value.to_string()),
            BodyKey::Type => self.kind = Some(BodyKind::from_config_str(value)),
            BodyKey::PositionX => self.position.x = parse_value(key, value)?,
            BodyKey::PositionY => self.position.y = parse_value(key, value)?,
            BodyKey::PositionZ => self.position.z = parse_value(key, value)?,
            BodyKey::Mass => self.mass = parse_value(key, value)?,
            BodyKey::Radius => self.radius = parse_value(key, value)?,
            BodyKey::VelocityX => self.velocity.x = parse_value(key, value)?,
            BodyKey::VelocityY => self.velocity.y = parse_value(key, value)?,
            BodyKey::VelocityZ => self.velocity.z = parse_value(key, value)?,
        }
        Ok(())
    }

    fn into_body(self, number: usize) -> Body {
        let name = self.name.unwrap_or_else(|| format!("BODY{number}"));
        Body::new(
            name,
            self.kind.unwrap_or(BodyKind::Unknown),
            self.position,
            self.velocity,
            self.mass,
            self.radius,
        )
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Split `BODY_<n>_<FIELD>` into its number and field text.
fn split_body_key(key: &str) -> Option<(usize, &str)> {
    let rest = key.strip_prefix("BODY_")?;
    let (number, field) = rest.split_once('_')?;
    Some((number.parse().ok()?, field))
}

// ── Parsing ────────────────────────────────────────────────────

/// Parse configuration text against a body capacity of `max_body_size`.
///
/// Belt bodies are *not* generated here; [`load`] does that. The
/// capacity check does account for them.
///
/// # Errors
///
/// [`ConfigError::TooManyBodies`] if a body number needs a slot beyond
/// the capacity, or if the configured and belt bodies together exceed it.
pub fn parse_str(text: &str, max_body_size: usize) -> Result<SimulationFile, ConfigError> {
    let mut file = SimulationFile::default();
    let mut specs: IndexMap<usize, BodySpec> = IndexMap::new();

    for raw in text.lines() {
        let line = raw.trim_end();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            warn!("ignoring configuration line '{line}' as this is malformed");
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        let applied = if key.starts_with("BODY_") {
            let Some((number, field)) = split_body_key(key) else {
                warn!("ignoring body configuration line '{line}': cannot extract body number");
                continue;
            };
            if number + 1 > max_body_size {
                return Err(ConfigError::TooManyBodies {
                    configured: number + 1,
                    capacity: max_body_size,
                });
            }
            let spec = specs.entry(number).or_default();
            match BodyKey::from_field(field) {
                Some(body_key) => spec.apply(key, body_key, value),
                None => {
                    warn!("ignoring unknown body field in '{line}'");
                    Ok(())
                }
            }
        } else {
            apply_global(&mut file, key, value)
        };

        if let Err(e) = applied {
            warn!("{e}; ignoring line");
        }
    }

    specs.sort_keys();
    file.bodies = specs
        .into_iter()
        .map(|(number, spec)| spec.into_body(number))
        .collect();

    if file.asteroid_belt > 0 && file.generated_asteroid_belt() == 0 {
        warn!(
            "asteroid belt of {} bodies is below the minimum of {MIN_ASTEROID_BELT}; no belt will be generated",
            file.asteroid_belt
        );
    }
    let required = file.required_slots();
    if required > max_body_size {
        return Err(ConfigError::TooManyBodies {
            configured: required,
            capacity: max_body_size,
        });
    }
    if required + HEADROOM_WARNING > max_body_size {
        warn!(
            "only {} of {max_body_size} body slots free after loading; \
             collisions and comets may exhaust capacity",
            max_body_size - required
        );
    }
    Ok(file)
}

fn apply_global(file: &mut SimulationFile, key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
        "NUM_TIMESTEPS" => file.num_timesteps = parse_value(key, value)?,
        "DT" => file.dt = parse_value(key, value)?,
        "OUTPUT_FREQUENCY" => file.output_frequency = parse_value(key, value)?,
        "DISPLAY_PROGRESS_FREQUENCY" => file.display_frequency = parse_value(key, value)?,
        "NUM_ASTEROIDS_IN_BELT" => file.asteroid_belt = parse_value(key, value)?,
        "NUM_ASTEROIDS_IN_KUIPER" => file.kuiper_belt = parse_value(key, value)?,
        _ => warn!("ignoring unknown configuration key {key}"),
    }
    Ok(())
}

/// Read, parse and populate a configuration file.
///
/// Belt bodies are generated from a generator seeded with `seed`, so the
/// same file and seed always produce the same initial population.
///
/// # Errors
///
/// [`ConfigError::Unreadable`] if the file cannot be read, otherwise as
/// [`parse_str`].
pub fn load(
    path: impl AsRef<Path>,
    max_body_size: usize,
    seed: u64,
) -> Result<SimulationFile, ConfigError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let mut file = parse_str(&text, max_body_size)?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    append_belts(&mut file, &mut rng);
    info!(
        "loaded {} bodies from {} ({} asteroid belt, {} Kuiper belt)",
        file.bodies.len(),
        path.display(),
        file.asteroid_belt,
        file.kuiper_belt
    );
    Ok(file)
}
