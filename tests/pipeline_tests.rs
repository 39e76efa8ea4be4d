use std::error::Error;
use std::io::{self, Read};

use approx::assert_abs_diff_eq;
use serde::Deserialize;
use tilt_telemetry::{
    Frame, RawRegisterBlock, Receiver, TelemetryError, WireMode, decode_block, encode_block,
    orientation, parse_line, to_physical,
};

#[derive(Debug, Deserialize)]
struct Fixture {
    name: String,
    b0: u8,
    b1: u8,
    b2: u8,
    b3: u8,
    b4: u8,
    b5: u8,
    x_g: f32,
    y_g: f32,
    z_g: f32,
    pitch: f32,
    roll: f32,
    raw_line: String,
    derived_line: String,
}

impl Fixture {
    fn block(&self) -> RawRegisterBlock {
        RawRegisterBlock::new([self.b0, self.b1, self.b2, self.b3, self.b4, self.b5])
    }
}

fn load_fixtures() -> Result<Vec<Fixture>, Box<dyn Error>> {
    let mut reader = csv::Reader::from_path("testdata/tilt_fixtures.csv")?;
    let mut fixtures = Vec::new();
    for result in reader.deserialize() {
        fixtures.push(result?);
    }
    Ok(fixtures)
}

/// Feeds a byte stream in fixed-size reads, then signals end of stream
struct Trickle {
    data: Vec<u8>,
    chunk: usize,
}

impl Read for Trickle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.chunk.min(self.data.len()).min(buf.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data.drain(..n);
        Ok(n)
    }
}

#[test]
fn test_fixture_units_and_angles() -> Result<(), Box<dyn Error>> {
    let fixtures = load_fixtures()?;
    assert!(fixtures.len() >= 8);

    for fixture in &fixtures {
        let physical = to_physical(&decode_block(&fixture.block()));
        assert_abs_diff_eq!(physical.acceleration.x, fixture.x_g, epsilon = 1e-7);
        assert_abs_diff_eq!(physical.acceleration.y, fixture.y_g, epsilon = 1e-7);
        assert_abs_diff_eq!(physical.acceleration.z, fixture.z_g, epsilon = 1e-7);

        let frame = orientation(&physical)?;
        assert!(
            (frame.pitch - fixture.pitch).abs() < 1e-3,
            "{}: pitch {} != {}",
            fixture.name,
            frame.pitch,
            fixture.pitch
        );
        assert!(
            (frame.roll - fixture.roll).abs() < 1e-3,
            "{}: roll {} != {}",
            fixture.name,
            frame.roll,
            fixture.roll
        );
    }
    Ok(())
}

#[test]
fn test_fixture_wire_lines() -> Result<(), Box<dyn Error>> {
    for fixture in load_fixtures()? {
        let raw = encode_block(&fixture.block(), WireMode::Raw)?;
        assert_eq!(raw.as_str(), format!("{}\n", fixture.raw_line), "{}", fixture.name);

        let derived = encode_block(&fixture.block(), WireMode::Derived)?;
        assert_eq!(
            derived.as_str(),
            format!("{}\n", fixture.derived_line),
            "{}",
            fixture.name
        );
    }
    Ok(())
}

#[test]
fn test_fixture_lines_parse_back() -> Result<(), Box<dyn Error>> {
    for fixture in load_fixtures()? {
        let Frame::Orientation(frame) = parse_line(&fixture.derived_line, WireMode::Derived)?
        else {
            panic!("{}: expected orientation frame", fixture.name);
        };
        assert_abs_diff_eq!(frame.pitch, fixture.pitch, epsilon = 0.005);
        assert_abs_diff_eq!(frame.roll, fixture.roll, epsilon = 0.005);

        let Frame::Raw(sample) = parse_line(&fixture.raw_line, WireMode::Raw)? else {
            panic!("{}: expected raw frame", fixture.name);
        };
        assert_eq!(sample, decode_block(&fixture.block()));
    }
    Ok(())
}

#[test]
fn test_stream_survives_awkward_read_sizes() -> Result<(), Box<dyn Error>> {
    let fixtures = load_fixtures()?;
    let mut stream = Vec::new();
    for fixture in &fixtures {
        stream.extend_from_slice(encode_block(&fixture.block(), WireMode::Derived)?.as_bytes());
    }

    for chunk in [1, 3, 7, 64] {
        let reader = Trickle {
            data: stream.clone(),
            chunk,
        };
        let mut receiver = Receiver::new(reader, WireMode::Derived, 16);
        let mut frames = Vec::new();
        loop {
            match receiver.poll() {
                Ok(batch) => {
                    for decoded in batch {
                        frames.push(decoded?);
                    }
                }
                Err(TelemetryError::ConnectionClosed) => break,
                Err(e) => return Err(e.into()),
            }
        }

        let expected: Vec<Frame> = fixtures
            .iter()
            .map(|f| parse_line(&f.derived_line, WireMode::Derived))
            .collect::<Result<_, _>>()?;
        assert_eq!(frames, expected, "chunk size {chunk}");
    }
    Ok(())
}

#[test]
fn test_interleaved_garbage_is_dropped() {
    let stream = b"1.00\n12.35,-7.89\n,,\n\xff\n3.00,4.00\n".to_vec();
    let mut receiver = Receiver::new(Trickle { data: stream, chunk: 5 }, WireMode::Derived, 32);

    let mut good = Vec::new();
    let mut bad = 0;
    while let Ok(batch) = receiver.poll() {
        for decoded in batch {
            match decoded {
                Ok(frame) => good.push(frame),
                Err(TelemetryError::MalformedLine { .. }) => bad += 1,
                Err(e) => panic!("unexpected error {e}"),
            }
        }
    }

    assert_eq!(bad, 3);
    assert_eq!(good.len(), 2);
    let Frame::Orientation(first) = good[0] else {
        panic!("expected orientation frame");
    };
    assert_abs_diff_eq!(first.pitch, 12.35, epsilon = 1e-4);
    assert_abs_diff_eq!(first.roll, -7.89, epsilon = 1e-4);
}
