//! Error types for the Vigil runtime.
//!
//! Most of the runtime prefers silent no-ops (instrumenting a scalar, writing
//! an identical value). The variants here cover the few cases where a caller
//! handed us something we cannot work with.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VigilError {
    #[error("Invalid property path: {0:?}")]
    InvalidPath(String),

    #[error("Unknown directive: {0}")]
    UnknownDirective(String),

    #[error("Malformed interpolation: {0:?}")]
    MalformedInterpolation(String),

    #[error("Invalid compiler options: {0}")]
    InvalidOptions(String),

    #[error("View model data must be a record")]
    NotARecord,

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, VigilError>;
