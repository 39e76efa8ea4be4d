//! Register decoding: packed register bytes to signed 12-bit counts

use crate::error::Result;
use crate::math::{FIELD_MAX, FIELD_RANGE};
use crate::types::{RawAxisSample, RawRegisterBlock};

/// Reinterprets an unsigned 12-bit count as two's-complement
///
/// Values above 2047 wrap to negative by subtracting 4096.
#[inline]
pub fn decode_count(count: u16) -> i16 {
    let count = i32::from(count) & (FIELD_RANGE - 1);
    if count > FIELD_MAX {
        (count - FIELD_RANGE) as i16
    } else {
        count as i16
    }
}

/// Inverse of [`decode_count`]: signed count back to its 12-bit field value
#[inline]
pub fn encode_count(value: i16) -> u16 {
    (i32::from(value).rem_euclid(FIELD_RANGE)) as u16
}

/// Combines one LSB/MSB pair into an unsigned 12-bit count
///
/// The shift must run before sign correction: the register holds the
/// 12-bit field in its upper bits.
#[inline]
fn axis_count(lsb: u8, msb: u8) -> u16 {
    ((u16::from(msb) << 8) | u16::from(lsb)) >> 4
}

/// Decodes a register block into signed axis counts
///
/// # Example
/// ```
/// use tilt_telemetry::{RawRegisterBlock, decode_block};
///
/// // z = 0x400 = 1024 counts, i.e. 1 g on the ±2 g range
/// let block = RawRegisterBlock::new([0x00, 0x00, 0x00, 0x00, 0x00, 0x40]);
/// let sample = decode_block(&block);
/// assert_eq!((sample.x, sample.y, sample.z), (0, 0, 1024));
/// ```
pub fn decode_block(block: &RawRegisterBlock) -> RawAxisSample {
    let [x_lsb, x_msb, y_lsb, y_msb, z_lsb, z_msb] = *block.bytes();
    RawAxisSample {
        x: decode_count(axis_count(x_lsb, x_msb)),
        y: decode_count(axis_count(y_lsb, y_msb)),
        z: decode_count(axis_count(z_lsb, z_msb)),
    }
}

/// Decodes bytes straight off the bus
///
/// Fails with [`crate::TelemetryError::MalformedBlock`] unless exactly six
/// bytes are given.
pub fn decode_bytes(bytes: &[u8]) -> Result<RawAxisSample> {
    let block = RawRegisterBlock::try_from(bytes)?;
    Ok(decode_block(&block))
}
