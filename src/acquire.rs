//! Sensor acquisition
//!
//! The bus itself is an external collaborator behind [`RegisterBus`]; the
//! [`Acquirer`] owns whichever bus it is given and turns each read into a
//! [`RawRegisterBlock`]. [`I2cBus`] adapts any `embedded-hal` I2C driver, and
//! [`SimulatedBus`] stands in for hardware.

use embedded_hal::i2c::{Error as _, I2c};
use log::trace;

use crate::config::AcquirerSettings;
use crate::decoder::decode_block;
use crate::error::{Result, TelemetryError};
use crate::math::{COUNTS_PER_FULL_SCALE, DEG_TO_RAD, FIELD_MAX, FULL_SCALE_G};
use crate::types::{RawAxisSample, RawRegisterBlock};

/// Block reads from a register-addressed sensor bus
pub trait RegisterBus {
    /// Reads up to `buf.len()` bytes starting at `register` on `device`
    ///
    /// Returns the number of bytes actually read.
    fn read_block(&mut self, device: u8, register: u8, buf: &mut [u8]) -> Result<usize>;
}

impl<B: RegisterBus + ?Sized> RegisterBus for &mut B {
    fn read_block(&mut self, device: u8, register: u8, buf: &mut [u8]) -> Result<usize> {
        (**self).read_block(device, register, buf)
    }
}

/// [`RegisterBus`] over an `embedded-hal` I2C bus
///
/// Each read is a single write-read transaction: the register address is
/// written, then the block is read back.
pub struct I2cBus<I> {
    i2c: I,
}

impl<I: I2c> I2cBus<I> {
    pub fn new(i2c: I) -> Self {
        Self { i2c }
    }

    pub fn into_inner(self) -> I {
        self.i2c
    }
}

impl<I: I2c> RegisterBus for I2cBus<I> {
    fn read_block(&mut self, device: u8, register: u8, buf: &mut [u8]) -> Result<usize> {
        self.i2c
            .write_read(device, &[register], buf)
            .map_err(|e| TelemetryError::SensorBus(format!("{:?}", e.kind())))?;
        Ok(buf.len())
    }
}

/// Synthetic accelerometer: a board rocking gently in pitch and roll
///
/// Pitch follows a sine and roll a cosine of the same period, so the board
/// traces a slow circle. Readings are exact gravity vectors for the chosen
/// angles, quantised to counts and laid out like the real registers.
#[derive(Debug, Clone)]
pub struct SimulatedBus {
    tick: u64,
    period: u64,
    pitch_amplitude: f32,
    roll_amplitude: f32,
}

impl SimulatedBus {
    /// Rocks ±`pitch_amplitude`/±`roll_amplitude` degrees over `period` reads
    pub fn new(period: u64, pitch_amplitude: f32, roll_amplitude: f32) -> Self {
        Self {
            tick: 0,
            period: period.max(1),
            pitch_amplitude,
            roll_amplitude,
        }
    }

    /// Counts for a board held at `pitch`/`roll` degrees
    pub fn sample_at(pitch: f32, roll: f32) -> RawAxisSample {
        let x = (pitch * DEG_TO_RAD).sin();
        let y = (roll * DEG_TO_RAD).sin();
        let z = (1.0 - x * x - y * y).max(0.0).sqrt();
        let to_counts = |g: f32| {
            let counts = (g * COUNTS_PER_FULL_SCALE / FULL_SCALE_G).round() as i32;
            counts.clamp(-FIELD_MAX - 1, FIELD_MAX) as i16
        };
        RawAxisSample::new(to_counts(x), to_counts(y), to_counts(z))
    }

    fn angles(&self) -> (f32, f32) {
        let phase = (self.tick % self.period) as f32 / self.period as f32;
        let theta = phase * core::f32::consts::TAU;
        (
            self.pitch_amplitude * theta.sin(),
            self.roll_amplitude * theta.cos(),
        )
    }
}

impl Default for SimulatedBus {
    fn default() -> Self {
        // 5 s period at the default 50 ms cadence
        Self::new(100, 30.0, 20.0)
    }
}

impl RegisterBus for SimulatedBus {
    fn read_block(&mut self, _device: u8, _register: u8, buf: &mut [u8]) -> Result<usize> {
        let (pitch, roll) = self.angles();
        self.tick = self.tick.wrapping_add(1);

        let block = RawRegisterBlock::pack(Self::sample_at(pitch, roll));
        let n = buf.len().min(RawRegisterBlock::LEN);
        buf[..n].copy_from_slice(&block.bytes()[..n]);
        trace!("simulated read pitch={pitch:.2} roll={roll:.2}");
        Ok(n)
    }
}

/// Pulls register blocks from the sensor
pub struct Acquirer<B> {
    bus: B,
    device_address: u8,
    data_register: u8,
}

impl<B: RegisterBus> Acquirer<B> {
    /// Takes ownership of `bus` and reads the device named in `settings`
    pub fn new(bus: B, settings: &AcquirerSettings) -> Self {
        Self {
            bus,
            device_address: settings.device_address,
            data_register: settings.data_register,
        }
    }

    /// Reads one six-byte block
    ///
    /// A short read fails with [`TelemetryError::MalformedBlock`]; nothing is
    /// retried, the next cycle reads afresh.
    pub fn acquire(&mut self) -> Result<RawRegisterBlock> {
        let mut buf = [0u8; RawRegisterBlock::LEN];
        let n = self
            .bus
            .read_block(self.device_address, self.data_register, &mut buf)?;
        let bytes = buf
            .get(..n)
            .ok_or(TelemetryError::malformed_block(RawRegisterBlock::LEN, n))?;
        RawRegisterBlock::try_from(bytes)
    }

    /// Reads and decodes one sample
    pub fn read_sample(&mut self) -> Result<RawAxisSample> {
        self.acquire().map(|block| decode_block(&block))
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn into_inner(self) -> B {
        self.bus
    }
}
