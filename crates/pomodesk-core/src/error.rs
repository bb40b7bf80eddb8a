//! Core error types for pomodesk-core.
//!
//! Nothing in this crate is fatal: configuration and per-theme parse failures
//! are recovered where they happen, and only the outcomes a caller must react
//! to (validation, protected or missing themes, write failures) surface here.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pomodesk-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Theme registry errors
    #[error("Theme error: {0}")]
    Theme(#[from] ThemeError),

    /// Session history errors
    #[error("History error: {0}")]
    History(#[from] HistoryError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Key is not part of the configuration schema
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Value does not match the type of the key
    #[error("cannot parse '{value}' for '{key}'")]
    InvalidValue { key: String, value: String },
}

/// Theme registry errors.
#[derive(Error, Debug)]
pub enum ThemeError {
    /// A theme file could not be parsed
    #[error("Failed to parse theme file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// An imported theme lacks a required field
    #[error("Missing required theme field: {field}")]
    Validation { field: String },

    /// The built-in theme cannot be removed
    #[error("Theme '{0}' is built in and cannot be deleted")]
    Protected(String),

    /// No theme registered under the key
    #[error("Theme not found: {0}")]
    NotFound(String),

    /// Reading or writing a theme file failed
    #[error("Theme file error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Session history errors.
#[derive(Error, Debug)]
pub enum HistoryError {
    /// Writing the history file failed
    #[error("Failed to write history to {path}: {message}")]
    WriteFailed { path: PathBuf, message: String },
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl ValidationError {
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::InvalidValue { field, .. } => field,
        }
    }
}

impl ThemeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ThemeError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
