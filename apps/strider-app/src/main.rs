//! Strider quadruped controller CLI.
//!
//! Provides three modes of operation:
//! - `run`: Start the control loop headless with a logging actuator
//! - `check`: Validate a configuration file
//! - `info`: Print workspace crate versions

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::info;

use strider_body::{CalibrationTable, Command, LoggingActuator, NoTelemetry, runtime};
use strider_core::config::RobotConfig;
use strider_core::error::StriderError;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Strider quadruped motion controller.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the control loop headless and print the final state.
    Run {
        /// Configuration file; built-in defaults when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Seconds to run before shutting down.
        #[arg(short, long, default_value_t = 10)]
        seconds: u64,

        /// Start trotting immediately.
        #[arg(short, long)]
        walk: bool,
    },

    /// Validate a configuration file.
    Check {
        /// Configuration file to validate.
        config: PathBuf,
    },

    /// Print crate information.
    Info,
}

// ---------------------------------------------------------------------------
// Mode implementations
// ---------------------------------------------------------------------------

fn load_config(path: Option<&PathBuf>) -> Result<RobotConfig, StriderError> {
    match path {
        Some(path) => Ok(RobotConfig::from_file(path)?),
        None => Ok(RobotConfig::default()),
    }
}

fn run(config: Option<&PathBuf>, seconds: u64, walk: bool) -> Result<(), StriderError> {
    let config = load_config(config)?;
    let actuator = LoggingActuator::new(CalibrationTable::from_config(&config));

    let handle = runtime::spawn(&config, actuator, NoTelemetry)?;
    info!(rate_hz = config.control.rate_hz, seconds, walk, "running");

    if walk {
        handle.send(Command::StartWalk)?;
    }
    std::thread::sleep(Duration::from_secs(seconds));

    let snapshot = handle.snapshot();
    handle.shutdown();

    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("failed to serialize snapshot: {e}"),
    }
    Ok(())
}

fn check(path: &PathBuf) -> Result<(), StriderError> {
    let config = RobotConfig::from_file(path)?;
    println!(
        "ok: {} legs, {:.0} Hz control, stride {}, step height {}",
        config.legs.len(),
        config.control.rate_hz,
        config.gait.stride_length,
        config.gait.step_height
    );
    Ok(())
}

fn print_info() {
    println!("strider v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("crates:");
    println!("  strider-core       {}", env!("CARGO_PKG_VERSION"));
    println!("  strider-kinematics {}", env!("CARGO_PKG_VERSION"));
    println!("  strider-gait       {}", env!("CARGO_PKG_VERSION"));
    println!("  strider-body       {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("edition: 2024");
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Some(Commands::Run {
            config,
            seconds,
            walk,
        }) => run(config.as_ref(), seconds, walk),
        Some(Commands::Check { config }) => check(&config),
        Some(Commands::Info) | None => {
            print_info();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
