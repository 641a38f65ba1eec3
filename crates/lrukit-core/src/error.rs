//! Error types for lrukit-core

use thiserror::Error;

/// Result type alias using the library's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for lrukit-core
#[derive(Error, Debug)]
pub enum Error {
    /// Cache construction errors
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Operation script errors
    #[error("Script error: {0}")]
    Script(#[from] ScriptError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised when building a cache.
///
/// Lookups never fail: a missing key is `None`, not an error.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheError {
    /// Capacity must be a positive number of entries.
    #[error("cache capacity must be > 0")]
    ZeroCapacity,

    /// The arena needs `capacity + 2` slots and that does not fit in `usize`.
    #[error("cache capacity {0} is too large for the node pool")]
    CapacityOverflow(usize),
}

/// Configuration file errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read config file {0}: {1}")]
    ReadFailed(String, String),

    #[error("Failed to parse config: {0}")]
    ParseFailed(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Errors while loading an operation script for replay.
#[derive(Error, Debug)]
pub enum ScriptError {
    /// A text-form line could not be parsed.
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A JSON-form script could not be parsed.
    #[error("invalid JSON script: {0}")]
    Json(#[from] serde_json::Error),
}
