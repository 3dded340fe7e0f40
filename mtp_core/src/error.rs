//! Error types for the mtp_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for mtp_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog validation error
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),

    /// Category name with no entry in the rule table
    #[error("Invalid category: {0} (expected HEAVY, LIGHT or CORE)")]
    InvalidCategory(String),

    /// Machine id or number not present in the catalog
    #[error("Unknown machine: {0}")]
    UnknownMachine(String),

    /// Logging attempt with no valid sets
    #[error("Enter at least one set (reps > 0, weight >= 0) before logging")]
    EmptySessionRejected,

    /// Persisted data that does not have the expected shape
    #[error("Malformed persisted data for {key}: {reason}")]
    MalformedData { key: String, reason: String },

    /// Generic error
    #[error("{0}")]
    Other(String),
}
