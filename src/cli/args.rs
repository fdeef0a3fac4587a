//! CLI argument definitions using clap
//!
//! Commands:
//! - booking serve [--config <path>] [--host] [--port] [--mode] [--db]
//! - booking check-config --config <path>

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::observability::Mode;

/// Booking - flights and seat allocation over HTTP
#[derive(Parser, Debug)]
#[command(name = "booking")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP API
    Serve(ServeArgs),

    /// Validate a configuration file and print the effective values
    CheckConfig {
        /// Path to configuration file
        #[arg(long, default_value = "./booking.json")]
        config: PathBuf,
    },
}

/// Flags for `serve`; each overrides the configuration file and is in turn
/// overridden by its `BOOKING_API_*` environment variable.
#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// HTTP server host address
    #[arg(long)]
    pub host: Option<String>,

    /// HTTP server port
    #[arg(long)]
    pub port: Option<u16>,

    /// Service running mode
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,

    /// SQLite database path, or `:memory:`
    #[arg(long)]
    pub db: Option<String>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
