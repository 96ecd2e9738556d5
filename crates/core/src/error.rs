//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// business rules, conflicts). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation before any write was attempted.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A business rule was violated (illegal status transition, duplicate key, ...).
    ///
    /// `code` is a stable, machine-readable identifier surfaced to API clients.
    #[error("{code}: {message}")]
    BusinessRule { code: &'static str, message: String },

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested record does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// A concurrent write won the race (stale unit of work).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn business(code: &'static str, msg: impl Into<String>) -> Self {
        Self::BusinessRule {
            code,
            message: msg.into(),
        }
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Business error code, if this is a business-rule violation.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            DomainError::BusinessRule { code, .. } => Some(*code),
            _ => None,
        }
    }
}
