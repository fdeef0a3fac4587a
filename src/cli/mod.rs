//! CLI module for the booking service
//!
//! Provides command-line interface for:
//! - serve: Start the HTTP API
//! - check-config: Validate a configuration file

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command, ServeArgs};
pub use commands::{check_config, run, run_command, serve, Config, LimitsConfig, IN_MEMORY_DB};
pub use errors::{CliError, CliErrorCode, CliResult};
