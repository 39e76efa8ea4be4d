//! The two session loops
//!
//! The producer runs acquire → decode → encode → transmit → sleep, one cycle
//! at a time. The consumer runs read → frame → decode → model → render. Each
//! cycle ends in an explicit outcome: units that fail locally are logged and
//! dropped, and only connection loss (or another I/O failure) ends a loop
//! early.

use std::io::{Read, Write};

use log::{debug, info, warn};

use crate::acquire::{Acquirer, RegisterBus};
use crate::config::{AcquirerSettings, WireMode};
use crate::error::{Result, TelemetryError};
use crate::model::{polar_from_raw, rotation_matrix};
use crate::shutdown::Shutdown;
use crate::transport::{Receiver, Transmitter};
use crate::types::{Frame, OrientationFrame, PolarPoint, RawAxisSample, RotationMatrix, WireMessage};
use crate::wire::encode_block;

/// What happened in one producer cycle
#[derive(Debug)]
pub enum CycleOutcome {
    /// The line that went out
    Sent(WireMessage),
    /// The sample was dropped; the loop carries on
    Skipped(TelemetryError),
}

/// Counters reported when a loop stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Lines sent (producer) or frames rendered (consumer)
    pub delivered: u64,
    /// Samples or lines dropped
    pub dropped: u64,
}

/// Runs one producer cycle without pacing
///
/// Recoverable failures come back as [`CycleOutcome::Skipped`]; connection
/// loss and other I/O failures are returned as errors.
pub fn run_cycle<B, W>(
    acquirer: &mut Acquirer<B>,
    transmitter: &mut Transmitter<W>,
    mode: WireMode,
) -> Result<CycleOutcome>
where
    B: RegisterBus,
    W: Write,
{
    let message = match acquirer
        .acquire()
        .and_then(|block| encode_block(&block, mode))
    {
        Ok(message) => message,
        Err(e) if e.is_recoverable() => {
            warn!("skipping sample: {e}");
            return Ok(CycleOutcome::Skipped(e));
        }
        Err(e) => return Err(e),
    };

    transmitter.send(&message)?;
    debug!("sent {message}");
    Ok(CycleOutcome::Sent(message))
}

/// Producer loop: one cycle per `sample_interval` until `shutdown` fires
///
/// Cycles never overlap. Returns the counters on shutdown, or the error that
/// ended the session.
pub fn run_acquirer<B, W>(
    acquirer: &mut Acquirer<B>,
    transmitter: &mut Transmitter<W>,
    settings: &AcquirerSettings,
    shutdown: &Shutdown,
) -> Result<SessionStats>
where
    B: RegisterBus,
    W: Write,
{
    info!(
        "streaming in {} mode every {:?}",
        settings.mode, settings.sample_interval
    );
    let mut stats = SessionStats::default();

    while !shutdown.is_triggered() {
        match run_cycle(acquirer, transmitter, settings.mode) {
            Ok(CycleOutcome::Sent(_)) => stats.delivered += 1,
            Ok(CycleOutcome::Skipped(_)) => stats.dropped += 1,
            Err(e) => {
                info!(
                    "producer stopping after {} sent, {} skipped: {e}",
                    stats.delivered, stats.dropped
                );
                return Err(e);
            }
        }

        if !settings.sample_interval.is_zero() {
            shutdown.sleep(settings.sample_interval);
        }
    }

    info!(
        "producer shut down after {} sent, {} skipped",
        stats.delivered, stats.dropped
    );
    Ok(stats)
}

/// One display update
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderUpdate {
    /// Derived mode: received angles and the board rotation built from them
    Attitude {
        frame: OrientationFrame,
        rotation: RotationMatrix,
    },
    /// Raw mode: received counts and their x/y polar view
    Polar {
        sample: RawAxisSample,
        point: PolarPoint,
    },
}

/// Builds the display update for a decoded frame
pub fn model_frame(frame: &Frame) -> RenderUpdate {
    match frame {
        Frame::Orientation(frame) => RenderUpdate::Attitude {
            frame: *frame,
            rotation: rotation_matrix(frame),
        },
        Frame::Raw(sample) => RenderUpdate::Polar {
            sample: *sample,
            point: polar_from_raw(sample),
        },
    }
}

/// Consumer of display updates
///
/// The drawing backend lives outside this crate; anything that can take an
/// update can sit here, including a closure.
pub trait RenderSink {
    fn render(&mut self, update: &RenderUpdate);
}

impl<F: FnMut(&RenderUpdate)> RenderSink for F {
    fn render(&mut self, update: &RenderUpdate) {
        self(update)
    }
}

/// Text readout through the logger
#[derive(Debug, Default)]
pub struct LogSink;

impl RenderSink for LogSink {
    fn render(&mut self, update: &RenderUpdate) {
        match update {
            RenderUpdate::Attitude { frame, .. } => {
                info!("Pitch: {:6.2}°  Roll: {:6.2}°", frame.pitch, frame.roll);
            }
            RenderUpdate::Polar { sample, point } => {
                info!(
                    "x: {:5} y: {:5} z: {:5}  Angle: {:7.2}°  Magnitude: {:5.3} g",
                    sample.x,
                    sample.y,
                    sample.z,
                    point.angle.to_degrees(),
                    point.magnitude
                );
            }
        }
    }
}

/// Consumer loop: renders every decodable line until `shutdown` fires
///
/// Malformed lines are logged and dropped. The stream closing ends the loop
/// with [`TelemetryError::ConnectionClosed`].
pub fn run_receiver<R, S>(
    receiver: &mut Receiver<R>,
    sink: &mut S,
    shutdown: &Shutdown,
) -> Result<SessionStats>
where
    R: Read,
    S: RenderSink + ?Sized,
{
    info!("receiving in {} mode", receiver.mode());
    let mut stats = SessionStats::default();

    while !shutdown.is_triggered() {
        let batch = match receiver.poll() {
            Ok(batch) => batch,
            Err(e) => {
                info!(
                    "receiver stopping after {} frames, {} dropped: {e}",
                    stats.delivered, stats.dropped
                );
                return Err(e);
            }
        };

        for decoded in batch {
            match decoded {
                Ok(frame) => {
                    sink.render(&model_frame(&frame));
                    stats.delivered += 1;
                }
                Err(e) => {
                    warn!("dropping line: {e}");
                    stats.dropped += 1;
                }
            }
        }
    }

    info!(
        "receiver shut down after {} frames, {} dropped",
        stats.delivered, stats.dropped
    );
    Ok(stats)
}
