//! Error types shared across Pantry crates

use thiserror::Error;

/// Result type alias for Pantry operations
pub type Result<T> = std::result::Result<T, PantryError>;

/// Main error type for Pantry
#[derive(Error, Debug)]
pub enum PantryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A floating point column held NaN or an infinity, which JSON cannot carry
    #[error("Column value {value} is not a finite number")]
    NonFiniteNumber { value: f64 },

    #[error("Invalid UTC offset: {0} hours")]
    InvalidOffset(i32),

    #[error("Configuration error: {0}")]
    Config(String),
}
