//! Unit conversion and tilt derivation
//!
//! Raw counts are scaled to g with the fixed full-scale range, and pitch and
//! roll are read off the gravity vector. The tilt model assumes the board is
//! static; any linear acceleration shows up as false tilt.

use crate::error::{Result, TelemetryError};
use crate::math::{G_PER_COUNT, Vector3Ext};
use crate::types::{OrientationFrame, PhysicalSample, RawAxisSample};

/// Converts signed counts to g
///
/// # Example
/// ```
/// use tilt_telemetry::{RawAxisSample, to_physical};
///
/// let physical = to_physical(&RawAxisSample::new(0, -2048, 1024));
/// assert_eq!(physical.acceleration.x, 0.0);
/// assert_eq!(physical.acceleration.y, -2.0);
/// assert_eq!(physical.acceleration.z, 1.0);
/// ```
pub fn to_physical(sample: &RawAxisSample) -> PhysicalSample {
    PhysicalSample::new(sample.to_vector() * G_PER_COUNT)
}

/// Derives pitch and roll from a gravity reading
///
/// `pitch = atan2(x, sqrt(y² + z²))` and `roll = atan2(y, sqrt(x² + z²))`,
/// both in degrees. A reading with gravity entirely on x (or y) gives ±90°
/// without any special case.
///
/// Fails with [`TelemetryError::InvalidSample`] if the input or either angle
/// is non-finite.
pub fn orientation(sample: &PhysicalSample) -> Result<OrientationFrame> {
    let g = sample.acceleration;
    if !g.all_finite() {
        return Err(TelemetryError::InvalidSample(format!(
            "non-finite acceleration ({}, {}, {})",
            g.x, g.y, g.z
        )));
    }

    let frame = OrientationFrame::new(g.pitch_degrees(), g.roll_degrees());
    if !(frame.pitch.is_finite() && frame.roll.is_finite()) {
        return Err(TelemetryError::InvalidSample(format!(
            "non-finite tilt (pitch {}, roll {})",
            frame.pitch, frame.roll
        )));
    }
    Ok(frame)
}
