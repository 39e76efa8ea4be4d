//! Session configuration for both ends of the link

use core::fmt;
use core::str::FromStr;
use std::time::Duration;

/// Default TCP port for the telemetry stream
pub const DEFAULT_PORT: u16 = 5005;

/// I2C address of the accelerometer
pub const DEFAULT_DEVICE_ADDRESS: u8 = 0x18;

/// First data register (x LSB)
pub const DEFAULT_DATA_REGISTER: u8 = 0x02;

/// Line format used on the wire
///
/// Fixed for the whole connection and agreed out of band: both ends must be
/// started with the same mode.
///
/// # Example
/// ```
/// use tilt_telemetry::WireMode;
///
/// let mode: WireMode = "raw".parse().unwrap();
/// assert_eq!(mode, WireMode::Raw);
/// assert_eq!(mode.field_count(), 3);
/// assert_eq!(WireMode::default().to_string(), "derived");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireMode {
    /// `x,y,z` signed counts
    Raw,
    /// `pitch,roll` in degrees with two decimals
    #[default]
    Derived,
}

impl WireMode {
    /// Number of comma-separated fields per line
    pub const fn field_count(self) -> usize {
        match self {
            WireMode::Raw => 3,
            WireMode::Derived => 2,
        }
    }
}

impl fmt::Display for WireMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WireMode::Raw => "raw",
            WireMode::Derived => "derived",
        })
    }
}

impl FromStr for WireMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(WireMode::Raw),
            "derived" | "angles" => Ok(WireMode::Derived),
            other => Err(format!("unknown wire mode '{other}' (expected raw or derived)")),
        }
    }
}

/// Producer-side settings
///
/// # Example
/// ```
/// use std::time::Duration;
/// use tilt_telemetry::{AcquirerSettings, WireMode};
///
/// let settings = AcquirerSettings {
///     mode: WireMode::Raw,
///     sample_interval: Duration::from_millis(20),
///     ..Default::default()
/// };
/// assert_eq!(settings.bind_address, "0.0.0.0:5005");
/// ```
#[derive(Debug, Clone)]
pub struct AcquirerSettings {
    /// Line format sent to the receiver
    pub mode: WireMode,
    /// Bus address of the accelerometer
    pub device_address: u8,
    /// Register the six-byte data block starts at
    pub data_register: u8,
    /// Pause between cycles
    ///
    /// Pacing only; the receiver tolerates jitter and bursts.
    pub sample_interval: Duration,
    /// Address the producer listens on for its single client
    pub bind_address: String,
}

impl Default for AcquirerSettings {
    fn default() -> Self {
        Self {
            mode: WireMode::default(),
            device_address: DEFAULT_DEVICE_ADDRESS,
            data_register: DEFAULT_DATA_REGISTER,
            sample_interval: Duration::from_millis(50),
            bind_address: format!("0.0.0.0:{DEFAULT_PORT}"),
        }
    }
}

/// Consumer-side settings
#[derive(Debug, Clone)]
pub struct ReceiverSettings {
    /// Line format expected from the producer
    pub mode: WireMode,
    /// Producer host name or address
    pub host: String,
    /// Producer port
    pub port: u16,
    /// Bytes requested per socket read
    pub read_buffer_size: usize,
    /// How long one read may block before the loop checks for shutdown
    pub poll_timeout: Duration,
}

impl Default for ReceiverSettings {
    fn default() -> Self {
        Self {
            mode: WireMode::default(),
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            read_buffer_size: 1024,
            poll_timeout: Duration::from_millis(200),
        }
    }
}
