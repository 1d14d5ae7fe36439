//! Domain error types
//!
//! This module defines the error hierarchy for Canopy. All errors are
//! domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main Canopy error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum CanopyError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// FreiData repository errors
    #[error("FreiData error: {0}")]
    Freidata(#[from] FreidataError),

    /// Bundle service errors
    #[error("Bundler error: {0}")]
    Bundler(#[from] BundlerError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(String),

    /// Working-folder or archive validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Zip archive inspection or rewrite errors
    #[error("Archive error: {0}")]
    Archive(String),

    /// Resume state errors
    #[error("State error: {0}")]
    State(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Notification delivery errors (best-effort paths)
    #[error("Notification error: {0}")]
    Notification(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// FreiData repository-specific errors
///
/// Errors that occur when talking to the InvenioRDM-compatible repository.
/// These errors don't expose third-party HTTP client types.
#[derive(Debug, Error)]
pub enum FreidataError {
    /// Failed to connect to the repository
    #[error("Failed to connect to FreiData: {0}")]
    ConnectionFailed(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Non-success API response
    #[error("API error: {status} - {body}")]
    ApiError { status: u16, body: String },

    /// Record or draft not found
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    /// Community lookup did not resolve to exactly one community
    #[error("Community lookup failed: {0}")]
    CommunityLookup(String),

    /// Response body could not be interpreted
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// Request timed out
    #[error("Request timeout: {0}")]
    Timeout(String),
}

/// Bundle service-specific errors
///
/// Errors from the internal download service that assembles dataset bundles.
#[derive(Debug, Error)]
pub enum BundlerError {
    /// Failed to connect to the bundle service
    #[error("Failed to connect to bundle service: {0}")]
    ConnectionFailed(String),

    /// Non-success API response
    #[error("API error: {status} - {body}")]
    ApiError { status: u16, body: String },

    /// The service reported the bundle job as failed
    #[error("Bundle job failed: {0}")]
    JobFailed(String),

    /// Polling exceeded the configured deadline
    #[error("Bundle job timed out: {0}")]
    Timeout(String),

    /// Downloaded file failed size verification
    #[error("Download integrity check failed: {0}")]
    Integrity(String),

    /// Response body could not be interpreted
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for CanopyError {
    fn from(err: std::io::Error) -> Self {
        CanopyError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for CanopyError {
    fn from(err: serde_json::Error) -> Self {
        CanopyError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for CanopyError {
    fn from(err: toml::de::Error) -> Self {
        CanopyError::Configuration(format!("TOML parse error: {err}"))
    }
}
