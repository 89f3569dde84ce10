//! Error types for vaxscrape.
//!
//! Library crates use [`VaxError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all vaxscrape operations.
#[derive(Debug, thiserror::Error)]
pub enum VaxError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while fetching a source page.
    #[error("network error: {0}")]
    Network(String),

    /// HTML parsing, regex matching, or number cleaning error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// WebDriver session or rendering error.
    #[error("browser error: {0}")]
    Browser(String),

    /// Dataset read/write error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Record failed a sanity check or is missing a field.
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, VaxError>;

impl VaxError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = VaxError::config("unknown timezone 'Mars/Olympus'");
        assert_eq!(err.to_string(), "config error: unknown timezone 'Mars/Olympus'");

        let err = VaxError::validation("people_vaccinated exceeds total_vaccinations");
        assert!(err.to_string().contains("exceeds total_vaccinations"));

        let err = VaxError::Network("https://example.com: HTTP 503".into());
        assert!(err.to_string().starts_with("network error:"));
    }

    #[test]
    fn io_error_keeps_path() {
        let err = VaxError::io(
            "/tmp/missing.csv",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let msg = err.to_string();
        assert!(msg.contains("missing.csv"));
        assert!(msg.contains("gone"));
    }
}
