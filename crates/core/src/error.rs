//! Error types for tree-diagram input and configuration.
//!
//! Geometry itself never fails: malformed coordinates flow through as
//! degenerate output. Only the boundary (parsing trees and render
//! configuration) reports typed errors.

use thiserror::Error;

/// Core error type for tree-diagram operations.
#[derive(Debug, Error)]
pub enum Error {
    // I/O errors
    #[error("failed to read '{path}': {reason}")]
    ReadFailed { path: String, reason: String },

    // Parsing errors
    #[error("JSON parse error: {reason}")]
    JsonParseFailed { reason: String },

    #[error("TOML parse error: {reason}")]
    TomlParseFailed { reason: String },

    #[error("unsupported config format '{extension}' (expected .toml or .json)")]
    UnsupportedFormat { extension: String },

    // Validation errors
    #[error("unknown orientation '{0}' (expected 'horizontal' or 'vertical')")]
    UnknownOrientation(String),

    #[error("invalid config value for '{field}': {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("duplicate node id '{0}'")]
    DuplicateNodeId(String),

    #[error("tree has no nodes")]
    EmptyTree,
}

impl Error {
    /// Create a read error for `path`.
    pub fn read_failed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ReadFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a JSON parse error.
    pub fn json_parse_failed(reason: impl Into<String>) -> Self {
        Self::JsonParseFailed {
            reason: reason.into(),
        }
    }

    /// Create a TOML parse error.
    pub fn toml_parse_failed(reason: impl Into<String>) -> Self {
        Self::TomlParseFailed {
            reason: reason.into(),
        }
    }

    /// Create an invalid config error.
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// The standard Result type for tree-diagram operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::json_parse_failed("expected value at line 1");
        assert_eq!(err.to_string(), "JSON parse error: expected value at line 1");

        let err = Error::invalid_config("circle_radius", "must be positive");
        assert_eq!(
            err.to_string(),
            "invalid config value for 'circle_radius': must be positive"
        );

        let err = Error::UnknownOrientation("diagonal".to_string());
        assert!(err.to_string().contains("'diagonal'"));
    }

    #[test]
    fn test_result_type() {
        let failure: Result<()> = Err(Error::EmptyTree);
        assert!(matches!(failure, Err(Error::EmptyTree)));
    }
}
