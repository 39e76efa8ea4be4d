//! Error types for the telemetry pipeline.

use std::io;

use thiserror::Error;

/// Errors raised while acquiring, encoding, framing or decoding samples.
///
/// The first four kinds are local to one unit of work (one register read or
/// one wire line): the unit is dropped and the loop continues. Connection loss
/// ends the session.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Sensor read returned the wrong number of bytes.
    #[error("malformed register block: expected {expected} bytes, got {actual}")]
    MalformedBlock {
        /// Expected block length.
        expected: usize,
        /// Actual block length.
        actual: usize,
    },

    /// A derived value came out non-finite.
    #[error("invalid sample: {0}")]
    InvalidSample(String),

    /// A wire line could not be parsed.
    #[error("malformed line {line:?}: {reason}")]
    MalformedLine {
        /// The offending line, trimmed.
        line: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The sensor bus collaborator failed the read.
    #[error("sensor bus error: {0}")]
    SensorBus(String),

    /// The peer closed or reset the connection.
    #[error("connection closed by peer")]
    ConnectionClosed,

    /// Any other I/O failure on the connection.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

impl TelemetryError {
    /// Creates a malformed block error.
    #[must_use]
    pub const fn malformed_block(expected: usize, actual: usize) -> Self {
        Self::MalformedBlock { expected, actual }
    }

    /// Creates a malformed line error.
    #[must_use]
    pub fn malformed_line(line: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedLine {
            line: line.into(),
            reason: reason.into(),
        }
    }

    /// Whether the caller should skip the current unit and keep going.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MalformedBlock { .. }
                | Self::InvalidSample(_)
                | Self::MalformedLine { .. }
                | Self::SensorBus(_)
        )
    }

    /// Maps connection-loss I/O kinds to [`TelemetryError::ConnectionClosed`].
    pub(crate) fn from_transport(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::BrokenPipe
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::UnexpectedEof
            | io::ErrorKind::WriteZero => Self::ConnectionClosed,
            _ => Self::Io(err),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, TelemetryError>;
