//! Domain error types

use thiserror::Error;

/// Domain-level errors raised while templating or building schemas.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A template references a variable that has never been defined.
    #[error("variable '{0}' is not defined")]
    UndefinedVariable(String),

    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// A schema fragment has an invalid shape.
    #[error("invalid schema at '{path}': {reason}")]
    InvalidSchema {
        /// Dot-joined path of the offending node (empty for the root).
        path: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A pattern node holds an invalid regular expression.
    #[error("invalid pattern /{pattern}/: {reason}")]
    InvalidPattern {
        /// The pattern source.
        pattern: String,
        /// The regex compiler's message.
        reason: String,
    },
}

impl DomainError {
    /// Creates an `InvalidSchema` error.
    pub fn invalid_schema(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSchema {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
