//! Newline-delimited text protocol
//!
//! Every line is self-contained ASCII: `x,y,z\n` in raw mode (signed counts)
//! or `pitch,roll\n` in derived mode (degrees, two decimals, fixed point).
//! The receiver buffers bytes until a full line is present and never parses a
//! partial one.
//!
//! # Example
//! ```
//! use tilt_telemetry::wire::{LineFramer, parse_line, serialize};
//! use tilt_telemetry::{Frame, OrientationFrame, WireMode};
//!
//! let message = serialize(&Frame::Orientation(OrientationFrame::new(12.345, -7.891)));
//! assert_eq!(message.as_str(), "12.35,-7.89\n");
//!
//! let mut framer = LineFramer::new();
//! framer.push(b"12.35,-7");
//! assert!(framer.next_line().is_none());
//! framer.push(b".89\n");
//! let line = framer.next_line().unwrap().unwrap();
//! assert!(matches!(parse_line(&line, WireMode::Derived), Ok(Frame::Orientation(_))));
//! ```

use crate::config::WireMode;
use crate::decoder::decode_block;
use crate::encoder::{orientation, to_physical};
use crate::error::{Result, TelemetryError};
use crate::math::FIELD_MAX;
use crate::types::{Frame, OrientationFrame, RawAxisSample, RawRegisterBlock, WireMessage};

/// Longest line the framer will hold before giving up on it
pub const MAX_LINE_LEN: usize = 256;

/// Formats a frame as one wire line
pub fn serialize(frame: &Frame) -> WireMessage {
    WireMessage(match frame {
        Frame::Raw(s) => format!("{},{},{}\n", s.x, s.y, s.z),
        Frame::Orientation(o) => format!("{:.2},{:.2}\n", o.pitch, o.roll),
    })
}

/// Builds the frame a sample is sent as in the given mode
///
/// Raw mode passes the counts through; derived mode converts to g and then to
/// pitch/roll, failing with [`TelemetryError::InvalidSample`] on non-finite
/// results.
pub fn frame_for(sample: &RawAxisSample, mode: WireMode) -> Result<Frame> {
    match mode {
        WireMode::Raw => Ok(Frame::Raw(*sample)),
        WireMode::Derived => orientation(&to_physical(sample)).map(Frame::Orientation),
    }
}

/// Runs one block through decode, encode and serialize
pub fn encode_block(block: &RawRegisterBlock, mode: WireMode) -> Result<WireMessage> {
    let sample = decode_block(block);
    frame_for(&sample, mode).map(|frame| serialize(&frame))
}

/// Parses one trimmed line in the given mode
///
/// Fails with [`TelemetryError::MalformedLine`] on a field-count mismatch, an
/// unparsable or non-finite field, a raw count outside 12 bits, or an angle
/// outside (-180, 180].
pub fn parse_line(line: &str, mode: WireMode) -> Result<Frame> {
    let line = line.trim();
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != mode.field_count() {
        return Err(TelemetryError::malformed_line(
            line,
            format!(
                "expected {} fields, got {}",
                mode.field_count(),
                fields.len()
            ),
        ));
    }

    match mode {
        WireMode::Raw => {
            let mut counts = [0i16; 3];
            for (count, field) in counts.iter_mut().zip(&fields) {
                *count = parse_count(line, field)?;
            }
            Ok(Frame::Raw(RawAxisSample::new(counts[0], counts[1], counts[2])))
        }
        WireMode::Derived => {
            let pitch = parse_angle(line, fields[0])?;
            let roll = parse_angle(line, fields[1])?;
            Ok(Frame::Orientation(OrientationFrame::new(pitch, roll)))
        }
    }
}

fn parse_count(line: &str, field: &str) -> Result<i16> {
    let value: i16 = field
        .parse()
        .map_err(|e| TelemetryError::malformed_line(line, format!("field {field:?}: {e}")))?;
    if i32::from(value) > FIELD_MAX || i32::from(value) < -FIELD_MAX - 1 {
        return Err(TelemetryError::malformed_line(
            line,
            format!("count {value} outside 12-bit range"),
        ));
    }
    Ok(value)
}

fn parse_angle(line: &str, field: &str) -> Result<f32> {
    let value: f32 = field
        .parse()
        .map_err(|e| TelemetryError::malformed_line(line, format!("field {field:?}: {e}")))?;
    if !value.is_finite() {
        return Err(TelemetryError::malformed_line(
            line,
            format!("non-finite angle {field:?}"),
        ));
    }
    if value <= -180.0 || value > 180.0 {
        return Err(TelemetryError::malformed_line(
            line,
            format!("angle {value} outside (-180, 180]"),
        ));
    }
    Ok(value)
}

/// Splits a byte stream into lines
///
/// Bytes are appended as they arrive; complete lines are handed out in
/// arrival order and any trailing partial line stays buffered.
#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: Vec<u8>,
    // Inside an over-long line: drop bytes until its newline
    discarding: bool,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends freshly read bytes
    pub fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Number of bytes waiting for a newline
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Discards anything buffered
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.discarding = false;
    }

    /// Takes the next complete, non-blank line
    ///
    /// Returns `None` when no full line is buffered. Lines that are not UTF-8,
    /// or a buffer that grows past [`MAX_LINE_LEN`] without a newline, come
    /// back as [`TelemetryError::MalformedLine`] and are consumed. The rest of
    /// an over-long line, up to its newline, is dropped without a second error.
    pub fn next_line(&mut self) -> Option<Result<String>> {
        loop {
            let Some(end) = self.buffer.iter().position(|&b| b == b'\n') else {
                if self.discarding {
                    self.buffer.clear();
                } else if self.buffer.len() > MAX_LINE_LEN {
                    let dropped = self.buffer.len();
                    self.buffer.clear();
                    self.discarding = true;
                    return Some(Err(TelemetryError::malformed_line(
                        "",
                        format!("{dropped} bytes without a newline"),
                    )));
                }
                return None;
            };

            let raw: Vec<u8> = self.buffer.drain(..=end).collect();
            if self.discarding {
                self.discarding = false;
                continue;
            }
            let text = match String::from_utf8(raw) {
                Ok(text) => text,
                Err(e) => {
                    let lossy = String::from_utf8_lossy(e.as_bytes()).trim().to_string();
                    return Some(Err(TelemetryError::malformed_line(lossy, "not valid UTF-8")));
                }
            };

            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return Some(Ok(trimmed.to_string()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_serialize_raw() {
        let message = serialize(&Frame::Raw(RawAxisSample::new(-12, 0, 1024)));
        assert_eq!(message.as_str(), "-12,0,1024\n");
    }

    #[test]
    fn test_serialize_derived_rounds_to_two_decimals() {
        let message = serialize(&Frame::Orientation(OrientationFrame::new(12.345, -7.891)));
        assert_eq!(message.as_str(), "12.35,-7.89\n");

        let message = serialize(&Frame::Orientation(OrientationFrame::new(90.0, 0.0)));
        assert_eq!(message.as_str(), "90.00,0.00\n");
    }

    #[test]
    fn test_serialize_never_uses_exponent() {
        let message = serialize(&Frame::Orientation(OrientationFrame::new(1e-7, 179.999)));
        assert_eq!(message.as_str(), "0.00,180.00\n");
    }

    #[test]
    fn test_parse_derived() {
        let Frame::Orientation(frame) = parse_line("12.35,-7.89\n", WireMode::Derived).unwrap()
        else {
            panic!("expected an orientation frame");
        };
        assert_abs_diff_eq!(frame.pitch, 12.35, epsilon = 0.005);
        assert_abs_diff_eq!(frame.roll, -7.89, epsilon = 0.005);
    }

    #[test]
    fn test_parse_raw() {
        let frame = parse_line(" 5, -2048 ,2047", WireMode::Raw).unwrap();
        assert_eq!(frame, Frame::Raw(RawAxisSample::new(5, -2048, 2047)));
    }

    #[test]
    fn test_parse_rejects_wrong_field_count() {
        let err = parse_line("1.00", WireMode::Derived).unwrap_err();
        assert!(matches!(err, TelemetryError::MalformedLine { .. }));

        let err = parse_line("1.00,2.00", WireMode::Raw).unwrap_err();
        assert!(matches!(err, TelemetryError::MalformedLine { .. }));

        let err = parse_line("1,2,3", WireMode::Derived).unwrap_err();
        assert!(matches!(err, TelemetryError::MalformedLine { .. }));
    }

    #[test]
    fn test_parse_rejects_bad_fields() {
        for line in ["abc,1.0", "1.0,", "NaN,0.0", "inf,0.0", "999,2", "-180.00,0.00"] {
            let err = parse_line(line, WireMode::Derived).unwrap_err();
            assert!(matches!(err, TelemetryError::MalformedLine { .. }), "{line}");
        }
        for line in ["1.5,2,3", "2048,0,0", "0,-2049,0"] {
            let err = parse_line(line, WireMode::Raw).unwrap_err();
            assert!(matches!(err, TelemetryError::MalformedLine { .. }), "{line}");
        }
    }

    #[test]
    fn test_encode_block_in_both_modes() {
        // z = 1024 counts = 1 g, board flat
        let block = RawRegisterBlock::new([0x00, 0x00, 0x00, 0x00, 0x00, 0x40]);
        assert_eq!(encode_block(&block, WireMode::Raw).unwrap().as_str(), "0,0,1024\n");
        assert_eq!(
            encode_block(&block, WireMode::Derived).unwrap().as_str(),
            "0.00,0.00\n"
        );
    }

    #[test]
    fn test_framer_holds_partial_lines() {
        let mut framer = LineFramer::new();
        framer.push(b"1.00,2.");
        assert!(framer.next_line().is_none());
        assert_eq!(framer.pending(), 7);

        framer.push(b"00\n3.00");
        assert_eq!(framer.next_line().unwrap().unwrap(), "1.00,2.00");
        assert!(framer.next_line().is_none());
        assert_eq!(framer.pending(), 4);
    }

    #[test]
    fn test_framer_splits_bursts_in_order() {
        let mut framer = LineFramer::new();
        framer.push(b"1.00,2.00\n3.00,4.00\r\n\n");
        assert_eq!(framer.next_line().unwrap().unwrap(), "1.00,2.00");
        assert_eq!(framer.next_line().unwrap().unwrap(), "3.00,4.00");
        assert!(framer.next_line().is_none());
        assert_eq!(framer.pending(), 0);
    }

    #[test]
    fn test_framer_rejects_invalid_utf8_and_recovers() {
        let mut framer = LineFramer::new();
        framer.push(b"\xff\xfe,1\n1.00,2.00\n");
        assert!(matches!(
            framer.next_line(),
            Some(Err(TelemetryError::MalformedLine { .. }))
        ));
        assert_eq!(framer.next_line().unwrap().unwrap(), "1.00,2.00");
    }

    #[test]
    fn test_framer_drops_runaway_line() {
        let mut framer = LineFramer::new();
        framer.push(&[b'7'; MAX_LINE_LEN + 1]);
        assert!(matches!(
            framer.next_line(),
            Some(Err(TelemetryError::MalformedLine { .. }))
        ));
        assert_eq!(framer.pending(), 0);
    }

    #[test]
    fn test_parse_accepts_angle_domain_edges() {
        let frame = parse_line("180.00,-179.99", WireMode::Derived).unwrap();
        assert_eq!(frame, Frame::Orientation(OrientationFrame::new(180.0, -179.99)));
    }

    #[test]
    fn test_framer_drops_tail_of_runaway_line() {
        let mut framer = LineFramer::new();
        framer.push(&[b'9'; 300]);
        assert!(matches!(
            framer.next_line(),
            Some(Err(TelemetryError::MalformedLine { .. }))
        ));

        // The rest of the same line must not surface as a frame
        framer.push(b"99,2.00\n");
        assert!(framer.next_line().is_none());

        framer.push(b"1.00,2.00\n");
        assert_eq!(framer.next_line().unwrap().unwrap(), "1.00,2.00");
        assert!(framer.next_line().is_none());
    }

    #[test]
    fn test_framer_drops_runaway_tail_across_reads() {
        let mut framer = LineFramer::new();
        framer.push(&[b'1'; MAX_LINE_LEN + 1]);
        assert!(framer.next_line().unwrap().is_err());

        // Still no newline: swallowed silently, no second error
        framer.push(&[b'2'; MAX_LINE_LEN + 1]);
        assert!(framer.next_line().is_none());
        framer.push(b",3\n4.00,5.00\n");
        assert_eq!(framer.next_line().unwrap().unwrap(), "4.00,5.00");
    }
}
