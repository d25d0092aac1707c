//! Error types for the compliance service

use thiserror::Error;

/// Compliance service error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A tier name that is not one of public, internal, confidential, restricted
    #[error("Unknown compliance tier: {0}")]
    UnknownTier(String),

    /// Rule table construction error (bad pattern, duplicate tier)
    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    /// Requested incident does not exist in the source
    #[error("Not found: {0}")]
    NotFound(String),

    /// Incident source failure
    #[error("Incident source error: {0}")]
    Source(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for compliance operations
pub type Result<T> = std::result::Result<T, Error>;
