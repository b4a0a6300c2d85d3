//! Common error types for tabdeck

use thiserror::Error;

/// Common result type for tabdeck operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across tabdeck crates
#[derive(Error, Debug)]
pub enum Error {
    /// Referenced tab or component does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Backing file I/O failure other than "file absent"
    #[error("Persistence error: {0}")]
    Persistence(#[from] std::io::Error),

    /// Document could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
