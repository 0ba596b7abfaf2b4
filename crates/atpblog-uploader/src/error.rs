//! Error types for the upload pipeline.

use miette::Diagnostic;
use thiserror::Error;

/// Failures raised while persisting a payload.
#[derive(Debug, Error, Diagnostic)]
pub enum UploadError {
    /// Writing the payload to its destination failed.
    #[error("payload could not be written")]
    Io(#[from] std::io::Error),

    /// The backing store refused the payload or went away.
    #[error("store error: {0}")]
    Store(String),
}
