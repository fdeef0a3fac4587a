//! CLI command implementations
//!
//! `serve` resolves configuration (file, then flags, then environment),
//! installs the JSON logger, opens the store and runs the HTTP server until
//! a shutdown signal arrives.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::http_server::{BookingState, HttpServer, HttpServerConfig};
use crate::layout::LayoutLimits;
use crate::observability::{self, Mode};
use crate::query::{QueryCompiler, DEFAULT_LIMIT};
use crate::store::Store;

use super::args::{Command, ServeArgs};
use super::errors::{CliError, CliResult};

/// Database path that selects a private in-memory store
pub const IN_MEMORY_DB: &str = ":memory:";

/// Environment overrides, applied after flags when set and non-empty
pub const ENV_HOST: &str = "BOOKING_API_HTTP_HOST";
pub const ENV_PORT: &str = "BOOKING_API_HTTP_PORT";
pub const ENV_MODE: &str = "BOOKING_API_MODE";
pub const ENV_DB: &str = "BOOKING_API_DB";

/// Highest seats-per-row that still maps to letters `A`..`Z`
const MAX_LINES_CEILING: u32 = 26;

/// Limits section of the configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(flatten)]
    pub layout: LayoutLimits,

    /// Page size when a list request has no `limit`
    #[serde(default = "default_limit")]
    pub default_limit: u64,
}

fn default_limit() -> u64 {
    DEFAULT_LIMIT
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            layout: LayoutLimits::default(),
            default_limit: default_limit(),
        }
    }
}

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// `host`, `port` and `cors_origins`
    #[serde(flatten)]
    pub http: HttpServerConfig,

    #[serde(default)]
    pub mode: Mode,

    /// SQLite database path (default "booking.db")
    #[serde(default = "default_db")]
    pub db: String,

    #[serde(default)]
    pub limits: LimitsConfig,
}

fn default_db() -> String {
    "booking.db".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http: HttpServerConfig::default(),
            mode: Mode::default(),
            db: default_db(),
            limits: LimitsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// File values (or defaults), overridden by `serve` flags, then by
    /// `BOOKING_API_*` environment variables, then validated.
    pub fn resolve(args: &ServeArgs) -> CliResult<Self> {
        Self::resolve_with(args, |key| std::env::var(key).ok())
    }

    /// [`Config::resolve`] with an explicit environment lookup.
    pub fn resolve_with(
        args: &ServeArgs,
        env: impl Fn(&str) -> Option<String>,
    ) -> CliResult<Self> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };

        if let Some(host) = &args.host {
            config.http.host = host.clone();
        }
        if let Some(port) = args.port {
            config.http.port = port;
        }
        if let Some(mode) = args.mode {
            config.mode = mode;
        }
        if let Some(db) = &args.db {
            config.db = db.clone();
        }

        config.apply_env(|key| env(key).filter(|value| !value.is_empty()))?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> CliResult<()> {
        if let Some(host) = env(ENV_HOST) {
            self.http.host = host;
        }
        if let Some(port) = env(ENV_PORT) {
            self.http.port = port.parse().map_err(|_| {
                CliError::config_error(format!("{} is not a valid port: {}", ENV_PORT, port))
            })?;
        }
        if let Some(mode) = env(ENV_MODE) {
            self.mode = <Mode as clap::ValueEnum>::from_str(&mode, false).map_err(|_| {
                CliError::config_error(format!("{} is not a valid mode: {}", ENV_MODE, mode))
            })?;
        }
        if let Some(db) = env(ENV_DB) {
            self.db = db;
        }
        Ok(())
    }

    fn validate(&self) -> CliResult<()> {
        if self.http.host.is_empty() {
            return Err(CliError::config_error("host must not be empty"));
        }

        if self.http.port == 0 {
            return Err(CliError::config_error("port must be > 0"));
        }

        if self.db.is_empty() {
            return Err(CliError::config_error("db must not be empty"));
        }

        let limits = &self.limits;
        if limits.layout.max_lines == 0 || limits.layout.max_lines > MAX_LINES_CEILING {
            return Err(CliError::config_error(format!(
                "limits.max_lines must be between 1 and {}",
                MAX_LINES_CEILING
            )));
        }

        if limits.layout.max_rows == 0 {
            return Err(CliError::config_error("limits.max_rows must be > 0"));
        }

        if limits.default_limit == 0 {
            return Err(CliError::config_error("limits.default_limit must be > 0"));
        }

        Ok(())
    }

    fn open_store(&self) -> CliResult<Store> {
        let store = if self.db == IN_MEMORY_DB {
            Store::open_in_memory()
        } else {
            Store::open(&self.db)
        };
        store.map_err(|e| CliError::boot_failed(format!("Failed to open store: {}", e)))
    }
}

/// Main entry point for CLI
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve(args) => serve(&args),
        Command::CheckConfig { config } => check_config(&config),
    }
}

/// Start the booking HTTP API
pub fn serve(args: &ServeArgs) -> CliResult<()> {
    let config = Config::resolve(args)?;

    observability::init(config.mode)
        .map_err(|e| CliError::boot_failed(format!("Failed to install logger: {}", e)))?;

    let store = config.open_store()?;
    info!(db = %config.db, mode = %config.mode, "Store ready");

    let state = BookingState::new(
        store,
        QueryCompiler::new(config.limits.default_limit),
        config.limits.layout,
    );
    let server = HttpServer::with_state(config.http.clone(), Arc::new(state));

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })?;

    Ok(())
}

/// Validate a configuration file and print the effective values
pub fn check_config(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
