//! Error types for host operations

use thiserror::Error;

/// Result type for host operations
pub type Result<T> = std::result::Result<T, HostError>;

/// Errors that can cross the host seam.
///
/// Only the key/value store is fallible; permission and eligibility checks
/// answer with booleans by contract.
#[derive(Debug, Error)]
pub enum HostError {
    /// The backing store rejected a read or write
    #[error("store error for key '{key}': {message}")]
    Store { key: String, message: String },

    /// IO error from a file-backed host implementation
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
