//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit code.

use std::fmt;
use std::io;

use crate::inspector::InspectError;
use crate::storage::StorageError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdout)
    IoError,
    /// Store could not be opened, read or written
    StoreError,
    /// Inspection server could not start
    ServeFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "LAB_CLI_CONFIG_ERROR",
            Self::IoError => "LAB_CLI_IO_ERROR",
            Self::StoreError => "LAB_CLI_STORE_ERROR",
            Self::ServeFailed => "LAB_CLI_SERVE_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Store error
    pub fn store_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::StoreError, msg)
    }

    /// Server start failed
    pub fn serve_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ServeFailed, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<StorageError> for CliError {
    fn from(e: StorageError) -> Self {
        Self::store_error(e.to_string())
    }
}

impl From<InspectError> for CliError {
    fn from(e: InspectError) -> Self {
        match e {
            InspectError::Config(msg) => Self::config_error(msg),
            other => Self::serve_failed(other.to_string()),
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_has_code_prefix() {
        let err = CliError::config_error("bad port");
        assert_eq!(err.to_string(), "LAB_CLI_CONFIG_ERROR: bad port");
    }

    #[test]
    fn test_inspect_error_mapping() {
        let err: CliError = InspectError::Config("endpoint".to_string()).into();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);

        let err: CliError = InspectError::ListenerLost.into();
        assert_eq!(err.code_str(), "LAB_CLI_SERVE_FAILED");

        let err: CliError = InspectError::Bind {
            addr: "127.0.0.1:9999".to_string(),
            source: io::Error::new(io::ErrorKind::AddrInUse, "in use"),
        }
        .into();
        assert_eq!(err.code(), &CliErrorCode::ServeFailed);
        assert!(err.message().contains("127.0.0.1:9999"));
    }
}
