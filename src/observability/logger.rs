//! Structured JSON logging
//!
//! One JSON object per event on stdout. The level follows the run mode
//! unless `RUST_LOG` is set.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Service run mode
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Dev,
    Staging,
    Prod,
}

impl Mode {
    /// Default filter directive for this mode
    pub fn default_level(&self) -> &'static str {
        match self {
            Mode::Dev => "debug",
            Mode::Staging | Mode::Prod => "info",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Dev => "dev",
            Mode::Staging => "staging",
            Mode::Prod => "prod",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the filter for `mode`, preferring `RUST_LOG` when it parses.
pub fn env_filter(mode: Mode) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(mode.default_level()))
}

/// Install the global JSON subscriber. Fails if one is already installed.
pub fn init(mode: Mode) -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().json().with_target(false))
        .with(env_filter(mode))
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_levels() {
        assert_eq!(Mode::Dev.default_level(), "debug");
        assert_eq!(Mode::Staging.default_level(), "info");
        assert_eq!(Mode::Prod.default_level(), "info");
    }

    #[test]
    fn test_mode_serde_is_lowercase() {
        let mode: Mode = serde_json::from_str("\"staging\"").unwrap();
        assert_eq!(mode, Mode::Staging);
        assert_eq!(serde_json::to_string(&Mode::Prod).unwrap(), "\"prod\"");
        assert!(serde_json::from_str::<Mode>("\"debug\"").is_err());
    }

    #[test]
    fn test_second_init_fails() {
        let _ = init(Mode::Prod);
        assert!(init(Mode::Prod).is_err());
    }
}
