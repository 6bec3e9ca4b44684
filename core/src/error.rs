//! The two error kinds raised while declaring and processing options.

use thiserror::Error;

use crate::{MessageKey, ValidationError};

/// Misuse of the declaration API: duplicate tokens, missing mode, bad child
/// names, ill-typed defaults.
///
/// These are programming errors of the caller and are never translated.
/// The scope path names where the problem was found and grows when the
/// error is re-raised by a parent.
///
/// # Examples
///
/// ```
/// use argscope_core::{DeclarationError, ValidationError};
///
/// let err = DeclarationError::from_validation("alpha", ValidationError::DuplicateLong {
///     option: "Auto".into(),
///     token: "auto".into(),
/// });
/// let err = err.with_context("global");
/// assert_eq!(err.scope(), "global.alpha");
/// assert_eq!(err.to_string(), "[global.alpha] double long value for Auto: auto");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[{scope}] {message}")]
pub struct DeclarationError {
    scope: String,
    message: String,
}

impl DeclarationError {
    pub fn new(scope: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            message: message.into(),
        }
    }

    pub fn from_validation(scope: impl Into<String>, error: ValidationError) -> Self {
        Self::new(scope, error.to_string())
    }

    /// Prepends a parent scope to the path.
    pub fn with_context(mut self, parent: &str) -> Self {
        self.scope = if self.scope.is_empty() {
            parent.to_string()
        } else {
            format!("{parent}.{}", self.scope)
        };
        self
    }

    /// Dotted path of the scope that raised the error.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A problem with user input, rendered through the message table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParamError {
    key: MessageKey,
    message: String,
}

impl ParamError {
    pub fn new(key: MessageKey, message: impl Into<String>) -> Self {
        Self {
            key,
            message: message.into(),
        }
    }

    /// Which message produced this error.
    pub fn key(&self) -> MessageKey {
        self.key
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Prepends context to the message, keeping the key.
    pub fn with_context(mut self, context: &str) -> Self {
        self.message = format!("{context}: {}", self.message);
        self
    }
}
