//! Rubble CLI - Headless driver for deformable fracturing surfaces
//!
//! # Commands
//!
//! - `rubble init` - Create a new rubble.toml scenario
//! - `rubble simulate` - Run a scenario and print what broke
//! - `rubble presets` - List the built-in surface presets
//!
//! # Usage
//!
//! ```bash
//! # Start from the destroy-fixed preset
//! rubble init --preset destroy-fixed
//!
//! # Run it for 300 ticks and dump the eroded mesh
//! rubble simulate --ticks 300 --obj eroded.obj
//! ```
//!
//! # Scenario (rubble.toml)
//!
//! ```toml
//! [simulation]
//! ticks = 120
//! tick_rate = 60
//!
//! [mesh]
//! primitive = "plane"
//! size_x = 4.0
//! size_z = 4.0
//! subdivisions_x = 32
//! subdivisions_z = 32
//!
//! [drill]
//! mode = "contact"
//! start = [-1.0, 0.0, 0.0]
//! end = [1.0, 0.0, 0.0]
//!
//! [surface.fracture]
//! threshold = 0.4
//! destroy_percent = 0.8
//! ```

mod init;
mod presets;
mod scenario;
mod sim_host;
mod simulate;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Rubble CLI - Headless driver for deformable fracturing surfaces
#[derive(Parser)]
#[command(name = "rubble")]
#[command(about = "Headless driver for deformable fracturing surfaces")]
#[command(version)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new rubble.toml scenario
    Init(init::InitArgs),

    /// Run a scenario headlessly
    Simulate(simulate::SimulateArgs),

    /// List built-in surface presets
    Presets,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Init(args) => init::execute(args),
        Commands::Simulate(args) => simulate::execute(args),
        Commands::Presets => {
            presets::execute();
            Ok(())
        }
    }
}
