//! Command-line access to expansion board endpoints.
//!
//! ```text
//! qwxioe --bus /dev/i2c-1 list
//! qwxioe --bus /dev/i2c-1 read exp0/w0
//! qwxioe --config boards.toml write exp0/s1 1
//! ```
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

use qwx_ioe::{BoardBinding, BoardConfig, DriverConfig, BOARD_IDENTITY_ADDRESS};

#[derive(Parser, Debug)]
#[command(name = "qwxioe", version, about = "Read and drive QWX expansion board endpoints")]
struct Cli {
    /// TOML file listing the boards to attach
    #[arg(long, conflicts_with = "bus")]
    config: Option<PathBuf>,

    /// i2c-dev node of a single board
    #[arg(long)]
    bus: Option<PathBuf>,

    /// Bus address of the board (decimal or 0x-prefixed hex)
    #[arg(long, value_parser = parse_address, default_value_t = BOARD_IDENTITY_ADDRESS)]
    address: u8,

    /// Board name used as endpoint prefix
    #[arg(long, default_value = "exp0")]
    name: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List endpoint names
    List,
    /// Read an endpoint
    Read { endpoint: String },
    /// Write a value to an output endpoint
    Write { endpoint: String, value: String },
}

fn parse_address(text: &str) -> Result<u8, String> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => text.parse(),
    };

    parsed.map_err(|err| format!("invalid address {}: {}", text, err))
}

fn init_logging() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var("RUST_LOG")
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn bindings(cli: &Cli) -> Result<Vec<BoardBinding>> {
    if let Some(path) = &cli.config {
        let config = DriverConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?;
        return Ok(config.boards);
    }

    match &cli.bus {
        Some(bus) => Ok(vec![BoardBinding {
            bus: bus.clone(),
            compatible: qwx_ioe::driver::COMPATIBLE[0].to_owned(),
            board: BoardConfig {
                name: cli.name.clone(),
                address: cli.address,
            },
        }]),
        None => bail!("either --config or --bus is required"),
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn run(cli: Cli) -> Result<()> {
    use qwx_ioe::{Driver, EndpointTable, LinuxI2c};
    use std::io::Write;

    let mut driver = Driver::new(EndpointTable::new());
    for binding in bindings(&cli)? {
        let transport = LinuxI2c::open(&binding.bus)
            .with_context(|| format!("opening {}", binding.bus.display()))?;
        driver
            .probe(&binding.compatible, transport, &binding.board)
            .with_context(|| format!("attaching board {}", binding.board.name))?;
    }

    let table = driver.exposure();
    match &cli.command {
        Command::List => {
            for name in table.names() {
                println!("{}", name);
            }
        }
        Command::Read { endpoint } => {
            let text = table.read(endpoint).with_context(|| format!("reading {}", endpoint))?;
            std::io::stdout().write_all(text.as_bytes())?;
        }
        Command::Write { endpoint, value } => {
            table
                .write(endpoint, value.as_bytes())
                .with_context(|| format!("writing {}", endpoint))?;
        }
    }

    for report in driver.shutdown() {
        let detached = report?;
        for failure in &detached.failures {
            tracing::warn!(endpoint = %failure.name, error = %failure.error, "endpoint left registered");
        }
    }

    Ok(())
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn run(cli: Cli) -> Result<()> {
    bindings(&cli)?;
    bail!("i2c-dev transport is only available on Linux")
}

fn main() -> Result<()> {
    init_logging();
    run(Cli::parse())
}
