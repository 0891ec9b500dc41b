//! Error handling for the nested case-control sampler.
//!
//! Only configuration and integration problems are errors. Data problems
//! (missing provider, empty caliper windows, exhausted candidate pools)
//! degrade to fewer controls and never surface here.

use std::io;

use arrow::error::ArrowError;

/// Specialized error type for the sampler
#[derive(Debug, thiserror::Error)]
pub enum SamplingError {
    /// The sampling configuration is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A uniform candidate distribution was requested over an empty store
    #[error("Eligibility record store is empty; cannot draw candidates")]
    EmptyEligibilityStore,

    /// Error reading a configuration file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error parsing a JSON configuration
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error building the Arrow result table
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),
}

impl SamplingError {
    /// Create an invalid configuration error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

/// Result type for sampler operations
pub type Result<T> = std::result::Result<T, SamplingError>;
