//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// These are the failures detected locally, before any request is sent
/// (missing fields, malformed numbers). Transport and backend failures live in
/// the client crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A form value failed validation (e.g. missing or non-positive field).
    #[error("{0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure, zero, negative).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested record was not found in an already-loaded list.
    #[error("not found")]
    NotFound,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
