//! Sensor constants and nalgebra helpers for the telemetry pipeline

use nalgebra::Vector3;

/// Mathematical constants
pub const DEG_TO_RAD: f32 = core::f32::consts::PI / 180.0;
pub const RAD_TO_DEG: f32 = 180.0 / core::f32::consts::PI;

/// Full-scale range selected on the sensor, in g.
///
/// Changing the sensor's range setting means changing this constant only.
pub const FULL_SCALE_G: f32 = 2.0;

/// Raw counts spanning one full-scale range (half of the 12-bit field).
pub const COUNTS_PER_FULL_SCALE: f32 = 2048.0;

/// Width of one axis field in bits
pub const FIELD_BITS: u32 = 12;

/// Number of distinct values in one axis field (2^12)
pub const FIELD_RANGE: i32 = 1 << FIELD_BITS;

/// Largest positive signed count (2^11 - 1)
pub const FIELD_MAX: i32 = FIELD_RANGE / 2 - 1;

/// g per raw count
pub const G_PER_COUNT: f32 = FULL_SCALE_G / COUNTS_PER_FULL_SCALE;

/// Extension trait for gravity-vector trigonometry
pub trait Vector3Ext {
    /// Returns true if every component is finite
    fn all_finite(&self) -> bool;

    /// Angle in degrees between the x component and the y/z plane
    fn pitch_degrees(&self) -> f32;

    /// Angle in degrees between the y component and the x/z plane
    fn roll_degrees(&self) -> f32;
}

impl Vector3Ext for Vector3<f32> {
    fn all_finite(&self) -> bool {
        self.iter().all(|c| c.is_finite())
    }

    fn pitch_degrees(&self) -> f32 {
        self.x.atan2((self.y * self.y + self.z * self.z).sqrt()) * RAD_TO_DEG
    }

    fn roll_degrees(&self) -> f32 {
        self.y.atan2((self.x * self.x + self.z * self.z).sqrt()) * RAD_TO_DEG
    }
}
