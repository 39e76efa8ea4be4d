//! Display-side consumer
//!
//! Connects to a running acquirer and prints a text readout of each decoded
//! frame until Ctrl-C or until the acquirer closes the stream.
//!
//! Run with: `cargo run --bin tilt-receiver -- --host 192.168.1.20 --mode raw`

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use tilt_telemetry::{
    DEFAULT_PORT, LogSink, Receiver, ReceiverSettings, Shutdown, WireMode, run_receiver, transport,
};

/// Receive accelerometer telemetry and print it
#[derive(Parser, Debug)]
#[command(name = "tilt-receiver")]
#[command(about = "Receive accelerometer telemetry and print it", long_about = None)]
#[command(version)]
struct Cli {
    /// Acquirer host name or address
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Acquirer port
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Line format the acquirer was started with
    #[arg(long, default_value_t = WireMode::Derived)]
    mode: WireMode,

    /// Bytes requested per socket read
    #[arg(long, default_value_t = 1024)]
    read_buffer: usize,

    /// Milliseconds a read may block before checking for Ctrl-C
    #[arg(long, default_value_t = 200)]
    poll_timeout_ms: u64,
}

impl Cli {
    fn settings(&self) -> ReceiverSettings {
        ReceiverSettings {
            mode: self.mode,
            host: self.host.clone(),
            port: self.port,
            read_buffer_size: self.read_buffer,
            poll_timeout: Duration::from_millis(self.poll_timeout_ms),
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Cli::parse().settings();

    let shutdown = Shutdown::new();
    let handle = shutdown.clone();
    ctrlc::set_handler(move || handle.trigger()).context("installing Ctrl-C handler")?;

    let connection = transport::connect(&settings.host, settings.port, settings.poll_timeout)
        .with_context(|| format!("connecting to {}:{}", settings.host, settings.port))?;
    let mut receiver = Receiver::new(connection, settings.mode, settings.read_buffer_size);

    let stats = run_receiver(&mut receiver, &mut LogSink, &shutdown)
        .context("telemetry stream ended")?;
    info!("rendered {} frames, dropped {}", stats.delivered, stats.dropped);
    Ok(())
}
