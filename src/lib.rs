//! Tilt Telemetry - live accelerometer streaming for orientation displays
//!
//! A sensor host reads a 3-axis accelerometer, decodes its packed 12-bit
//! registers and streams each sample over TCP as one text line: either the
//! raw signed counts (`x,y,z`) or pitch and roll derived from the gravity
//! vector (`pitch,roll`). The receiving side frames the stream back into
//! lines and rebuilds a board rotation (or a planar polar point) for display.
//!
//! # Pipeline
//!
//! ```text
//! Acquirer -> decode_block -> to_physical/orientation -> serialize -> Transmitter
//!     ~~ TCP ~~> Receiver -> parse_line -> rotation_matrix / polar_point -> RenderSink
//! ```
//!
//! # Features
//!
//! - Two's-complement decoding of left-aligned 12-bit register fields
//! - Fixed ±2 g scaling and tilt-from-gravity pitch/roll
//! - Newline-framed wire format tolerant of split reads and bursts
//! - Per-unit error recovery: one bad read or line never ends a session
//! - `embedded-hal` I2C adapter plus a simulated sensor for running without hardware
//! - Cooperative shutdown for both loops
//!
//! # Quick Start
//!
//! ```rust
//! use tilt_telemetry::{RawRegisterBlock, WireMode, decode_block, encode_block, parse_line, rotation_matrix, Frame};
//!
//! // Board lying flat: 1 g on z
//! let block = RawRegisterBlock::new([0x00, 0x00, 0x00, 0x00, 0x00, 0x40]);
//! let sample = decode_block(&block);
//! assert_eq!(sample.z, 1024);
//!
//! // Producer side
//! let line = encode_block(&block, WireMode::Derived).unwrap();
//! assert_eq!(line.as_str(), "0.00,0.00\n");
//!
//! // Receiver side
//! if let Ok(Frame::Orientation(frame)) = parse_line(line.as_str(), WireMode::Derived) {
//!     let rotation = rotation_matrix(&frame);
//!     assert!((rotation.determinant() - 1.0).abs() < 1e-6);
//! }
//! ```

pub mod acquire;
mod config;
mod decoder;
mod encoder;
mod error;
mod math;
pub mod model;
pub mod session;
mod shutdown;
pub mod transport;
mod types;
pub mod wire;

// Re-export the pipeline surface
pub use acquire::{Acquirer, I2cBus, RegisterBus, SimulatedBus};
pub use config::{
    AcquirerSettings, DEFAULT_DATA_REGISTER, DEFAULT_DEVICE_ADDRESS, DEFAULT_PORT,
    ReceiverSettings, WireMode,
};
pub use decoder::{decode_block, decode_bytes, decode_count, encode_count};
pub use encoder::{orientation, to_physical};
pub use error::{Result, TelemetryError};
pub use math::{DEG_TO_RAD, FULL_SCALE_G, G_PER_COUNT, RAD_TO_DEG, Vector3Ext};
pub use model::{polar_from_raw, polar_point, rotation_matrix};
pub use session::{
    CycleOutcome, LogSink, RenderSink, RenderUpdate, SessionStats, run_acquirer, run_cycle,
    run_receiver,
};
pub use shutdown::Shutdown;
pub use transport::{Receiver, Transmitter};
pub use types::*;
pub use wire::{encode_block, parse_line, serialize};
