//! Binary layout of a [`Body`] crossing a collective operation.
//!
//! All integers and floats are little-endian. The name is a `u32`
//! length prefix followed by UTF-8 bytes. A body list is a `u32` count
//! followed by that many records. There is no padding and no schema on
//! the wire; both ends walk [`BODY_LAYOUT`] in order.
//!
//! Every field of [`Body`] appears exactly once in [`BODY_LAYOUT`].
//! Adding a field to `Body` means adding a [`BodyField`] variant, a slot
//! in the layout, and an arm in each of [`encode_body`] / [`decode_body`].

use std::io::{self, Read};

use orbis_core::{Body, BodyKind, Vec3};

use crate::error::WireError;

/// One transmitted field of a [`Body`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BodyField {
    /// `name`, length-prefixed UTF-8.
    Name,
    /// `position.x`, f64.
    PositionX,
    /// `position.y`, f64.
    PositionY,
    /// `position.z`, f64.
    PositionZ,
    /// `mass`, f64.
    Mass,
    /// `velocity.x`, f64.
    VelocityX,
    /// `velocity.y`, f64.
    VelocityY,
    /// `velocity.z`, f64.
    VelocityZ,
    /// `acceleration.x`, f64.
    AccelerationX,
    /// `acceleration.y`, f64.
    AccelerationY,
    /// `acceleration.z`, f64.
    AccelerationZ,
    /// `radius`, f64.
    Radius,
    /// `active`, u8 (0 or 1).
    Active,
    /// `kind`, u8 tag.
    Kind,
    /// `asteroid_hits`, u32.
    AsteroidHits,
    /// `comet_hits`, u32.
    CometHits,
}

/// Transmission order of body fields.
pub const BODY_LAYOUT: [BodyField; 16] = [
    BodyField::Name,
    BodyField::PositionX,
    BodyField::PositionY,
    BodyField::PositionZ,
    BodyField::Mass,
    BodyField::VelocityX,
    BodyField::VelocityY,
    BodyField::VelocityZ,
    BodyField::AccelerationX,
    BodyField::AccelerationY,
    BodyField::AccelerationZ,
    BodyField::Radius,
    BodyField::Active,
    BodyField::Kind,
    BodyField::AsteroidHits,
    BodyField::CometHits,
];

/// Encoded size of a body with an empty name.
const MIN_RECORD_LEN: usize = 4 + 11 * 8 + 2 + 2 * 4;

// ── Primitive writers ───────────────────────────────────────────

fn write_u8(buf: &mut Vec<u8>, v: u8) {
    buf.push(v);
}

fn write_u32_le(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn write_f64_le(buf: &mut Vec<u8>, v: f64) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn write_length_prefixed_str(buf: &mut Vec<u8>, s: &str) {
    write_u32_le(buf, s.len() as u32);
    buf.extend_from_slice(s.as_bytes());
}

// ── Primitive readers ───────────────────────────────────────────

fn read_u8(r: &mut dyn Read) -> Result<u8, WireError> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_u32_le(r: &mut dyn Read) -> Result<u32, WireError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_f64_le(r: &mut dyn Read) -> Result<f64, WireError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

fn read_length_prefixed_str(r: &mut dyn Read) -> Result<String, WireError> {
    let len = read_u32_le(r)? as usize;
    let mut buf = Vec::new();
    r.take(len as u64).read_to_end(&mut buf)?;
    if buf.len() != len {
        return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
    }
    String::from_utf8(buf).map_err(|e| WireError::InvalidName {
        detail: e.to_string(),
    })
}

// ── Body records ────────────────────────────────────────────────

/// Append one body record to `buf`.
pub fn encode_body(buf: &mut Vec<u8>, body: &Body) {
    for field in BODY_LAYOUT {
        match field {
            BodyField::Name => write_length_prefixed_str(buf, &body.name),
            BodyField::PositionX => write_f64_le(buf, body.position.x),
            BodyField::PositionY => write_f64_le(buf, body.position.y),
            BodyField::PositionZ => write_f64_le(buf, body.position.z),
            BodyField::Mass => write_f64_le(buf, body.mass),
            BodyField::VelocityX => write_f64_le(buf, body.velocity.x),
            BodyField::VelocityY => write_f64_le(buf, body.velocity.y),
            BodyField::VelocityZ => write_f64_le(buf, body.velocity.z),
            BodyField::AccelerationX => write_f64_le(buf, body.acceleration.x),
            BodyField::AccelerationY => write_f64_le(buf, body.acceleration.y),
            BodyField::AccelerationZ => write_f64_le(buf, body.acceleration.z),
            BodyField::Radius => write_f64_le(buf, body.radius),
            BodyField::Active => write_u8(buf, u8::from(body.active)),
            BodyField::Kind => write_u8(buf, body.kind.tag()),
            BodyField::AsteroidHits => write_u32_le(buf, body.asteroid_hits),
            BodyField::CometHits => write_u32_le(buf, body.comet_hits),
        }
    }
}

/// Read one body record.
pub fn decode_body(r: &mut dyn Read) -> Result<Body, WireError> {
    let mut body = Body::new(
        String::new(),
        BodyKind::Unknown,
        Vec3::ZERO,
        Vec3::ZERO,
        0.0,
        0.0,
    );
    for field in BODY_LAYOUT {
        match field {
            BodyField::Name => body.name = read_length_prefixed_str(r)?,
            BodyField::PositionX => body.position.x = read_f64_le(r)?,
            BodyField::PositionY => body.position.y = read_f64_le(r)?,
            BodyField::PositionZ => body.position.z = read_f64_le(r)?,
            BodyField::Mass => body.mass = read_f64_le(r)?,
            BodyField::VelocityX => body.velocity.x = read_f64_le(r)?,
            BodyField::VelocityY => body.velocity.y = read_f64_le(r)?,
            BodyField::VelocityZ => body.velocity.z = read_f64_le(r)?,
            BodyField::AccelerationX => body.acceleration.x = read_f64_le(r)?,
            BodyField::AccelerationY => body.acceleration.y = read_f64_le(r)?,
            BodyField::AccelerationZ => body.acceleration.z = read_f64_le(r)?,
            BodyField::Radius => body.radius = read_f64_le(r)?,
            BodyField::Active => body.active = read_u8(r)? != 0,
            BodyField::Kind => {
                let tag = read_u8(r)?;
                body.kind = BodyKind::from_tag(tag).ok_or(WireError::UnknownKind { tag })?;
            }
            BodyField::AsteroidHits => body.asteroid_hits = read_u32_le(r)?,
            BodyField::CometHits => body.comet_hits = read_u32_le(r)?,
        }
    }
    Ok(body)
}

/// Encode a contiguous slice of bodies as a counted list.
pub fn encode_bodies(bodies: &[Body]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(4 + bodies.len() * 128);
    write_u32_le(&mut buf, bodies.len() as u32);
    for body in bodies {
        encode_body(&mut buf, body);
    }
    buf
}

/// Decode a counted list produced by [`encode_bodies`].
///
/// The whole buffer must be consumed.
pub fn decode_bodies(bytes: &[u8]) -> Result<Vec<Body>, WireError> {
    let mut r = bytes;
    let count = read_u32_le(&mut r)? as usize;
    // The count is untrusted; never reserve more than the buffer could hold.
    let mut bodies = Vec::with_capacity(count.min(r.len() / MIN_RECORD_LEN));
    for _ in 0..count {
        bodies.push(decode_body(&mut r)?);
    }
    if !r.is_empty() {
        return Err(WireError::TrailingBytes {
            remaining: r.len(),
        });
    }
    Ok(bodies)
}

/// Encode a slot count for the population broadcast.
pub fn encode_count(count: usize) -> Vec<u8> {
    (count as u64).to_le_bytes().to_vec()
}

/// Decode a slot count produced by [`encode_count`].
pub fn decode_count(bytes: &[u8]) -> Result<usize, WireError> {
    let mut r = bytes;
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    if !r.is_empty() {
        return Err(WireError::TrailingBytes {
            remaining: r.len(),
        });
    }
    Ok(u64::from_le_bytes(buf) as usize)
}
