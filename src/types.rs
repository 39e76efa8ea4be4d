//! Core sample types carried through the telemetry pipeline
//!
//! Every value here is rebuilt for each sample cycle; nothing persists
//! between cycles except the connection itself.

use core::fmt;

use nalgebra::{Matrix3, Vector3};

use crate::error::TelemetryError;

/// Six bytes read from the sensor's data registers
///
/// Layout is `[x_lsb, x_msb, y_lsb, y_msb, z_lsb, z_msb]`. Each axis holds a
/// 12-bit two's-complement count left-aligned in its 16-bit pair, so the low
/// nibble of every LSB is padding.
///
/// # Example
/// ```
/// use tilt_telemetry::RawRegisterBlock;
///
/// let block = RawRegisterBlock::try_from(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x40][..]).unwrap();
/// assert_eq!(block.bytes()[5], 0x40);
///
/// assert!(RawRegisterBlock::try_from(&[0u8; 4][..]).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawRegisterBlock([u8; RawRegisterBlock::LEN]);

impl RawRegisterBlock {
    /// Number of bytes in one block
    pub const LEN: usize = 6;

    /// Wrap an exactly-sized buffer
    pub const fn new(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }

    /// Raw register bytes
    pub const fn bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    /// Lay a signed sample back out in register order
    ///
    /// This is the inverse of [`crate::decode_block`]; the padding nibble of
    /// each LSB is left at zero.
    pub fn pack(sample: RawAxisSample) -> Self {
        let mut bytes = [0u8; Self::LEN];
        for (pair, count) in bytes
            .chunks_exact_mut(2)
            .zip([sample.x, sample.y, sample.z])
        {
            let aligned = crate::decoder::encode_count(count) << 4;
            pair.copy_from_slice(&aligned.to_le_bytes());
        }
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for RawRegisterBlock {
    type Error = TelemetryError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let block: [u8; Self::LEN] = bytes
            .try_into()
            .map_err(|_| TelemetryError::malformed_block(Self::LEN, bytes.len()))?;
        Ok(Self(block))
    }
}

/// Signed 12-bit counts for the three axes, each in `[-2048, 2047]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawAxisSample {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl RawAxisSample {
    pub const fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }

    /// Counts as a float vector, still in raw units
    pub fn to_vector(&self) -> Vector3<f32> {
        Vector3::new(self.x as f32, self.y as f32, self.z as f32)
    }
}

/// Acceleration in g for the three axes
///
/// With the fixed ±2 g range every component lies in `[-2.0, 2.0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalSample {
    /// Acceleration vector in g
    pub acceleration: Vector3<f32>,
}

impl PhysicalSample {
    pub const fn new(acceleration: Vector3<f32>) -> Self {
        Self { acceleration }
    }
}

/// Board tilt derived from the gravity vector
///
/// Both angles are in degrees. Only meaningful while the board is static or
/// close to it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrientationFrame {
    /// Rotation of the x axis out of the horizontal plane, degrees
    pub pitch: f32,
    /// Rotation of the y axis out of the horizontal plane, degrees
    pub roll: f32,
}

impl OrientationFrame {
    pub const fn new(pitch: f32, roll: f32) -> Self {
        Self { pitch, roll }
    }
}

/// Planar reading for the raw-vector display
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarPoint {
    /// Direction of the x/y projection, radians
    pub angle: f32,
    /// Length of the x/y projection, g
    pub magnitude: f32,
}

/// 3x3 rotation used to draw the board in derived mode
pub type RotationMatrix = Matrix3<f32>;

/// One decoded line from the wire
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Frame {
    /// Raw-vector mode: signed counts
    Raw(RawAxisSample),
    /// Derived mode: pitch and roll in degrees
    Orientation(OrientationFrame),
}

/// One newline-terminated ASCII line, ready to write
///
/// Built only by [`crate::wire::serialize`], so it always carries every field
/// and exactly one trailing newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireMessage(pub(crate) String);

impl WireMessage {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for WireMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.trim_end())
    }
}
