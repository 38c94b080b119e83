//! Application error types

use thiserror::Error;
use wrestle_domain::{DomainError, ValidationError};

use crate::ports::TransportError;

/// Errors that stop a suite from running at all.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SuiteError {
    /// No base URL was configured before the suite began.
    #[error("base URL is not defined; set `base_url` or define the `url` variable")]
    BaseUrlNotDefined,

    /// `resume` was called on a suite that is neither paused nor interrupted.
    #[error("suite is not paused")]
    NotPaused,
}

/// Why a single test failed. Recorded on the test and in the report; never
/// aborts the suite.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TestFailure {
    /// Templating or schema preparation failed before the request was sent.
    #[error("{0}")]
    Template(#[from] DomainError),

    /// The response status differs from the expected one.
    #[error("expected status {expected}, got {actual}")]
    StatusMismatch {
        /// Expected status.
        expected: u16,
        /// Actual status.
        actual: u16,
    },

    /// The response body does not match the compiled schema.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The transport could not complete the exchange.
    #[error("{0}")]
    Transport(#[from] TransportError),
}

/// Result type alias for suite lifecycle operations.
pub type SuiteResult<T> = Result<T, SuiteError>;
