//! Error types for HostKit

use thiserror::Error;

/// HostKit error type
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// Malformed deployment input. Surfaced before any composition begins.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// No network or subnet satisfying the constraints exists in inventory.
    #[error("resolution error: {0}")]
    Resolution(String),

    /// A component was composed before its dependency. Programming defect.
    #[error("dependency violation: {0}")]
    DependencyViolation(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for HostKit
pub type ProvisionResult<T> = Result<T, ProvisionError>;
