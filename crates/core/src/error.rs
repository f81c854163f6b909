//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every failure the catalog can report is one of these variants. The HTTP
/// adapter maps each one onto a status code; nothing below the adapter
/// retries or swallows them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A field of a create/update request failed validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// An operation argument was out of range (e.g. negative availability).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The referenced record does not exist.
    #[error("not found")]
    NotFound,

    /// The identifier is already taken.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
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

    /// Stable machine-readable code, used in error response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::InvalidId(_) => "invalid_id",
            Self::NotFound => "not_found",
            Self::Conflict(_) => "conflict",
        }
    }
}
