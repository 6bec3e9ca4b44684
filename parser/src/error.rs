//! Error type for building, processing and configuring a scope tree.
//!
//! Declaration problems and user input problems keep their own types from
//! `argscope-core`; this enum adds the I/O and serialization failures of
//! settings files and exports.

use argscope_core::{DeclarationError, ParamError};
use thiserror::Error;

/// Errors returned by [`ParamTree`](crate::ParamTree) operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The declared options or scopes are invalid.
    #[error("declaration error: {0}")]
    Declaration(#[from] DeclarationError),

    /// The command line or an imported document is invalid.
    #[error("{0}")]
    Param(#[from] ParamError),

    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// The user input error, if this is one.
    pub fn as_param(&self) -> Option<&ParamError> {
        match self {
            Error::Param(err) => Some(err),
            _ => None,
        }
    }

    /// The declaration error, if this is one.
    pub fn as_declaration(&self) -> Option<&DeclarationError> {
        match self {
            Error::Declaration(err) => Some(err),
            _ => None,
        }
    }
}

/// Convenience alias for results with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
