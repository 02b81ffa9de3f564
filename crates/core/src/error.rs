//! Errors raised by record transitions and id parsing.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// Why a business record refused a change.
///
/// Only deterministic outcomes of the record's own rules live here. Storage,
/// bus and transport failures are reported by the layers that own them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input the record will not accept, such as a zero quantity.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The record is in a state where the change makes no sense.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The command targets a record that was never created.
    #[error("not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
