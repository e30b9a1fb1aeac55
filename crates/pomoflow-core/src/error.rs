//! Core error types for pomoflow-core.
//!
//! This module defines the error hierarchy using thiserror. Protocol errors
//! never reach the host: the worker logs and drops malformed messages.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pomoflow-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Inbound message could not be decoded
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The worker task has exited and no longer accepts commands
    #[error("Timer worker has shut down")]
    WorkerClosed,

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
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Home directory could not be determined
    #[error("Could not determine the home directory")]
    NoHomeDir,
}

/// Errors decoding an inbound command message.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Message is not a JSON object of the expected shape
    #[error("Malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    /// No `command` field
    #[error("Message has no command")]
    MissingCommand,

    /// `command` names nothing the engine understands
    #[error("Unknown command '{0}'")]
    UnknownCommand(String),

    /// Required payload field absent
    #[error("Command '{command}' is missing field '{field}'")]
    MissingField {
        command: &'static str,
        field: &'static str,
    },

    /// NaN or infinite payload value
    #[error("Command '{command}' has a non-finite '{field}'")]
    NotFinite {
        command: &'static str,
        field: &'static str,
    },
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<ValidationError> for ConfigError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidValue { field, message } => ConfigError::InvalidValue {
                key: field,
                message,
            },
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
