//! Sensor-side producer
//!
//! Waits for one receiver to connect, then streams a line per sample until
//! Ctrl-C or until the receiver goes away.
//!
//! Run with: `cargo run --bin tilt-acquirer -- --simulate --mode raw`

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::info;
use tilt_telemetry::{
    Acquirer, AcquirerSettings, DEFAULT_DATA_REGISTER, DEFAULT_DEVICE_ADDRESS, DEFAULT_PORT,
    RegisterBus, Shutdown, SimulatedBus, Transmitter, WireMode, run_acquirer, transport,
};

const NO_HARDWARE: &str =
    "built without the `i2cdev` feature; pass --simulate or rebuild with it enabled";

/// Stream accelerometer samples to a single TCP client
#[derive(Parser, Debug)]
#[command(name = "tilt-acquirer")]
#[command(about = "Stream accelerometer samples to a single TCP client", long_about = None)]
#[command(version)]
struct Cli {
    /// Address to listen on
    #[arg(long, default_value_t = format!("0.0.0.0:{DEFAULT_PORT}"))]
    bind: String,

    /// Line format: raw counts or derived pitch/roll
    #[arg(long, default_value_t = WireMode::Derived)]
    mode: WireMode,

    /// Milliseconds between samples
    #[arg(long, default_value_t = 50)]
    interval_ms: u64,

    /// Sensor bus address (decimal or 0x-prefixed hex)
    #[arg(long, value_parser = parse_byte, default_value_t = DEFAULT_DEVICE_ADDRESS)]
    device: u8,

    /// First data register (decimal or 0x-prefixed hex)
    #[arg(long, value_parser = parse_byte, default_value_t = DEFAULT_DATA_REGISTER)]
    register: u8,

    /// Use a synthetic rocking board instead of real hardware
    #[arg(long)]
    simulate: bool,

    /// I2C character device the sensor is attached to
    #[cfg(feature = "i2cdev")]
    #[arg(long, default_value = "/dev/i2c-1")]
    i2c_device: std::path::PathBuf,
}

impl Cli {
    fn settings(&self) -> AcquirerSettings {
        AcquirerSettings {
            mode: self.mode,
            device_address: self.device,
            data_register: self.register,
            sample_interval: Duration::from_millis(self.interval_ms),
            bind_address: self.bind.clone(),
        }
    }
}

fn parse_byte(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid byte '{s}': {e}"))
}

fn stream<B: RegisterBus, W: Write>(
    bus: B,
    transmitter: &mut Transmitter<W>,
    settings: &AcquirerSettings,
    shutdown: &Shutdown,
) -> Result<()> {
    let mut acquirer = Acquirer::new(bus, settings);
    let stats = run_acquirer(&mut acquirer, transmitter, settings, shutdown)
        .context("telemetry session ended")?;
    info!("sent {} samples, skipped {}", stats.delivered, stats.dropped);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let settings = cli.settings();

    if !cli.simulate && !cfg!(feature = "i2cdev") {
        bail!(NO_HARDWARE);
    }

    let shutdown = Shutdown::new();
    let handle = shutdown.clone();
    ctrlc::set_handler(move || handle.trigger()).context("installing Ctrl-C handler")?;

    let listener = transport::listen(&settings.bind_address)
        .with_context(|| format!("binding {}", settings.bind_address))?;
    let Some((connection, _peer)) = transport::accept_once(listener, &shutdown)? else {
        info!("shut down before a receiver connected");
        return Ok(());
    };
    let mut transmitter = Transmitter::new(connection);

    if cli.simulate {
        return stream(SimulatedBus::default(), &mut transmitter, &settings, &shutdown);
    }
    stream_hardware(&cli, &mut transmitter, &settings, &shutdown)
}

#[cfg(feature = "i2cdev")]
fn stream_hardware<W: Write>(
    cli: &Cli,
    transmitter: &mut Transmitter<W>,
    settings: &AcquirerSettings,
    shutdown: &Shutdown,
) -> Result<()> {
    let i2c = linux_embedded_hal::I2cdev::new(&cli.i2c_device)
        .with_context(|| format!("opening {}", cli.i2c_device.display()))?;
    stream(tilt_telemetry::I2cBus::new(i2c), transmitter, settings, shutdown)
}

#[cfg(not(feature = "i2cdev"))]
fn stream_hardware<W: Write>(
    _cli: &Cli,
    _transmitter: &mut Transmitter<W>,
    _settings: &AcquirerSettings,
    _shutdown: &Shutdown,
) -> Result<()> {
    bail!(NO_HARDWARE)
}
