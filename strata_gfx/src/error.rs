//! Error types for Strata GFX
//!
//! Every fallible buffer or driver operation returns [`Result`]. Errors are
//! logged where they are raised (see `engine_err!`), so callers only need to
//! propagate them.

use std::fmt;

/// Result type for Strata operations
pub type Result<T> = std::result::Result<T, Error>;

/// Strata errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Driver-level failure (invalid operation, missing entry point, lost context)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource description or argument (size, range, data length)
    InvalidResource(String),

    /// Operation not allowed in the current resource state
    InvalidState(String),

    /// Operation recognised but not implemented
    Unsupported(String),

    /// Device context could not be created
    InitializationFailed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            Error::Unsupported(msg) => write!(f, "Unsupported operation: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
