//! Application-wide error types.
//!
//! This module provides a unified error hierarchy for the application.
//! Library modules use specific error types via `thiserror`, while
//! CLI/main uses `anyhow` for convenient error propagation.
//!
//! # Design
//!
//! - [`Error`]: Top-level application error enum
//! - Module-specific errors ([`ConfigError`]) for detailed handling
//! - All errors implement `std::error::Error` for compatibility
//!
//! Provider errors never reach the dispatcher's caller; search tasks absorb
//! them, so there is no provider variant here.
//!
//! # Example
//!
//! ```ignore
//! use lyric_minder::error::{Result, ResultExt};
//!
//! fn read_requests(path: &Path) -> Result<String> {
//!     std::fs::read_to_string(path).with_context(format!("reading {}", path.display()))
//! }
//! ```

use crate::config::ConfigError;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
///
/// Aggregates errors from all subsystems for unified handling.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Malformed user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, ConfigError> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Config(e).context(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::invalid_input("line 3: expected 3 fields");
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::from(ConfigError::NoConfigDir).context("Writing default config");
        let msg = err.to_string();
        assert!(msg.starts_with("Writing default config"));
        assert!(msg.contains("Configuration error"));
    }

    #[test]
    fn test_result_ext() {
        let result: Result<()> = Err(Error::invalid_input("test"));
        let with_ctx = result.with_context("additional context");
        assert!(with_ctx.unwrap_err().to_string().contains("additional context"));
    }

    #[test]
    fn test_io_result_ext() {
        let result: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let err = result.with_context("reading requests.tsv").unwrap_err();
        assert!(matches!(err, Error::WithContext { .. }));
        assert!(err.to_string().starts_with("reading requests.tsv"));
    }

    #[test]
    fn test_config_error_converts() {
        let err: Error = ConfigError::NoConfigDir.into();
        assert!(matches!(err, Error::Config(ConfigError::NoConfigDir)));
    }
}
