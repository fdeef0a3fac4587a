//! CLI-specific error types
//!
//! Every CLI error is fatal: the binary prints `<CODE>: <message>` and exits
//! non-zero.

use std::io;

use thiserror::Error;

/// Stable process-level failure codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Unreadable, malformed or out-of-range configuration
    ConfigError,
    /// Writing to stdout failed
    IoError,
    /// Logger, store, runtime or listener could not start
    BootFailed,
}

impl CliErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "BOOKING_CLI_CONFIG_ERROR",
            Self::IoError => "BOOKING_CLI_IO_ERROR",
            Self::BootFailed => "BOOKING_CLI_BOOT_FAILED",
        }
    }
}

#[derive(Debug, Error)]
#[error("{}: {message}", .code.code())]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, message)
    }

    pub fn boot_failed(message: impl Into<String>) -> Self {
        Self::new(CliErrorCode::BootFailed, message)
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Stable code string, e.g. `BOOKING_CLI_CONFIG_ERROR`
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        Self::new(CliErrorCode::IoError, err.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(CliErrorCode::IoError, format!("Failed to render config: {}", err))
    }
}

pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code() {
        let err = CliError::config_error("port must be > 0");
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
        assert_eq!(err.message(), "port must be > 0");
        assert_eq!(
            err.to_string(),
            "BOOKING_CLI_CONFIG_ERROR: port must be > 0"
        );
    }

    #[test]
    fn test_io_errors_map_to_io_code() {
        let err = CliError::from(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
        assert_eq!(err.code_str(), "BOOKING_CLI_IO_ERROR");
    }
}
