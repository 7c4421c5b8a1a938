//! Error types for startup and local state

use thiserror::Error;

/// Result type for configuration and local store operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Errors that can stop the client from starting or persisting local state
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Local state file could not be (de)serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config file is not valid TOML or has wrong field types
    #[error("Config file error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Server URL or route could not be parsed
    #[error("Invalid URL: {0}")]
    Url(String),

    /// No platform directory available for local state
    #[error("Configuration error: {0}")]
    Config(String),
}
