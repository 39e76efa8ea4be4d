//! Receiver-side reconstruction for display
//!
//! Derived mode rebuilds the board's attitude as a rotation matrix; raw mode
//! reduces the x/y axes to a polar point. Neither is sent back over the wire.

use nalgebra::{Rotation3, Vector3};

use crate::encoder::to_physical;
use crate::math::DEG_TO_RAD;
use crate::types::{OrientationFrame, PhysicalSample, PolarPoint, RawAxisSample, RotationMatrix};

/// Builds the board rotation `Ry(pitch) · Rx(roll)`
///
/// Roll is applied first, then pitch. Swapping the order changes the drawn
/// attitude whenever both angles are non-zero.
///
/// # Example
/// ```
/// use nalgebra::{Matrix3, Vector3};
/// use tilt_telemetry::{OrientationFrame, rotation_matrix};
///
/// let level = rotation_matrix(&OrientationFrame::new(0.0, 0.0));
/// assert!((level - Matrix3::identity()).norm() < 1e-6);
///
/// // Pitching 90° tips the board's x axis straight down
/// let r = rotation_matrix(&OrientationFrame::new(90.0, 0.0));
/// assert!((r * Vector3::x() - Vector3::new(0.0, 0.0, -1.0)).norm() < 1e-6);
/// ```
pub fn rotation_matrix(frame: &OrientationFrame) -> RotationMatrix {
    let rx = Rotation3::from_axis_angle(&Vector3::x_axis(), frame.roll * DEG_TO_RAD);
    let ry = Rotation3::from_axis_angle(&Vector3::y_axis(), frame.pitch * DEG_TO_RAD);
    (ry * rx).into_inner()
}

/// Polar view of the x/y plane: angle `atan2(y, x)` and length `hypot(x, y)`
///
/// z plays no part. Degenerate input propagates as NaN or infinity.
pub fn polar_point(sample: &PhysicalSample) -> PolarPoint {
    let g = sample.acceleration;
    PolarPoint {
        angle: g.y.atan2(g.x),
        magnitude: (g.x * g.x + g.y * g.y).sqrt(),
    }
}

/// Polar point straight from received counts
pub fn polar_from_raw(sample: &RawAxisSample) -> PolarPoint {
    polar_point(&to_physical(sample))
}
