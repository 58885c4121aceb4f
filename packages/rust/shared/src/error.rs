//! Error types for hexbridge.
//!
//! Library crates use [`HexbridgeError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all hexbridge operations.
#[derive(Debug, thiserror::Error)]
pub enum HexbridgeError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while fetching a source-app page.
    #[error("network error: {0}")]
    Network(String),

    /// HTML parsing or content extraction error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// The source tab did not finish loading the target URL in time.
    #[error("page load timed out for URL: {url}")]
    NavigationTimeout { url: String },

    /// The target app rejected an operation (runtime not reachable,
    /// root journal uncreatable, unknown annotation object, ...).
    #[error("target app error: {0}")]
    Target(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, HexbridgeError>;

impl HexbridgeError {
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

    /// Create a target-app error from any displayable message.
    pub fn target(msg: impl Into<String>) -> Self {
        Self::Target(msg.into())
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
        let err = HexbridgeError::config("missing base URL");
        assert_eq!(err.to_string(), "config error: missing base URL");

        let err = HexbridgeError::NavigationTimeout {
            url: "https://5e.hexroll.app/sandbox/abc/location/1".into(),
        };
        assert!(err.to_string().contains("timed out"));
        assert!(err.to_string().contains("/location/1"));
    }
}
