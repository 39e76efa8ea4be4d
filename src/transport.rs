//! Byte-stream plumbing: writing lines out and reading frames back
//!
//! [`Transmitter`] and [`Receiver`] work over any `Write`/`Read`, so the
//! pipeline can be driven from memory in tests; the TCP helpers below only
//! set up the one connection a session uses.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::Duration;

use log::{debug, info};

use crate::config::WireMode;
use crate::error::{Result, TelemetryError};
use crate::shutdown::Shutdown;
use crate::types::{Frame, WireMessage};
use crate::wire::{LineFramer, parse_line};

/// How often a pending accept checks for shutdown
const ACCEPT_POLL: Duration = Duration::from_millis(100);

/// Writes wire lines to a connection
pub struct Transmitter<W> {
    writer: W,
    sent: u64,
}

impl<W: Write> Transmitter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, sent: 0 }
    }

    /// Writes one whole line and flushes it
    ///
    /// A peer that has gone away surfaces as
    /// [`TelemetryError::ConnectionClosed`].
    pub fn send(&mut self, message: &WireMessage) -> Result<()> {
        self.writer
            .write_all(message.as_bytes())
            .and_then(|()| self.writer.flush())
            .map_err(TelemetryError::from_transport)?;
        self.sent += 1;
        Ok(())
    }

    /// Lines written so far
    pub fn sent(&self) -> u64 {
        self.sent
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Reads the byte stream and decodes complete lines
///
/// Each [`Receiver::poll`] does at most one read, so several lines may come
/// back at once after a burst, or none while a line is still arriving.
pub struct Receiver<R> {
    reader: R,
    mode: WireMode,
    framer: LineFramer,
    read_buf: Vec<u8>,
}

impl<R: Read> Receiver<R> {
    pub fn new(reader: R, mode: WireMode, read_buffer_size: usize) -> Self {
        Self {
            reader,
            mode,
            framer: LineFramer::new(),
            read_buf: vec![0; read_buffer_size.max(1)],
        }
    }

    pub fn mode(&self) -> WireMode {
        self.mode
    }

    /// Reads once and returns every line completed by that read
    ///
    /// Each entry is the decode result for one line, in arrival order; a
    /// malformed line fails only its own entry. A read timeout yields an empty
    /// batch. End of stream fails the whole poll with
    /// [`TelemetryError::ConnectionClosed`].
    pub fn poll(&mut self) -> Result<Vec<Result<Frame>>> {
        let n = match self.reader.read(&mut self.read_buf) {
            Ok(0) => {
                if self.framer.pending() > 0 {
                    debug!(
                        "discarding {} bytes of unterminated line at end of stream",
                        self.framer.pending()
                    );
                    self.framer.clear();
                }
                return Err(TelemetryError::ConnectionClosed);
            }
            Ok(n) => n,
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
                ) =>
            {
                return Ok(Vec::new());
            }
            Err(e) => return Err(TelemetryError::from_transport(e)),
        };

        self.framer.push(&self.read_buf[..n]);
        Ok(self.drain_lines())
    }

    fn drain_lines(&mut self) -> Vec<Result<Frame>> {
        let mut frames = Vec::new();
        while let Some(line) = self.framer.next_line() {
            frames.push(line.and_then(|line| parse_line(&line, self.mode)));
        }
        frames
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// Binds the producer's listening socket
pub fn listen<A: ToSocketAddrs>(addr: A) -> Result<TcpListener> {
    let listener = TcpListener::bind(addr)?;
    info!("listening on {}", listener.local_addr()?);
    Ok(listener)
}

/// Accepts exactly one client, then stops listening
///
/// Returns `None` if `shutdown` fires before anyone connects.
pub fn accept_once(
    listener: TcpListener,
    shutdown: &Shutdown,
) -> Result<Option<(TcpStream, SocketAddr)>> {
    listener.set_nonblocking(true)?;
    loop {
        if shutdown.is_triggered() {
            return Ok(None);
        }
        match listener.accept() {
            Ok((stream, peer)) => {
                stream.set_nonblocking(false)?;
                stream.set_nodelay(true)?;
                info!("accepted connection from {peer}");
                return Ok(Some((stream, peer)));
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => thread::sleep(ACCEPT_POLL),
            Err(e) => return Err(e.into()),
        }
    }
}

/// Connects to the producer
///
/// `poll_timeout` bounds each read so the receive loop can notice shutdown.
pub fn connect(host: &str, port: u16, poll_timeout: Duration) -> Result<TcpStream> {
    let stream = TcpStream::connect((host, port))?;
    stream.set_read_timeout(Some(poll_timeout))?;
    info!("connected to {host}:{port}");
    Ok(stream)
}
