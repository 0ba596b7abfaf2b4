//! Error types for the shared services.

use miette::Diagnostic;
use thiserror::Error;

/// Failures raised by mention directory lookups.
#[derive(Debug, Error, Diagnostic)]
pub enum DirectoryError {
    /// The backing service could not be reached.
    #[error("directory unavailable: {0}")]
    Unavailable(String),

    /// A profile list failed to deserialize.
    #[error("malformed profile data")]
    Decode(#[from] serde_json::Error),

    /// Reading a profile list failed.
    #[error("profile data unreadable")]
    Io(#[from] std::io::Error),
}
