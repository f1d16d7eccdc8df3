//! Storage error types for the social graph storage layer.
//!
//! Constraint failures (uniqueness and foreign keys) get their own variants so
//! callers can tell them apart from infrastructure failures.

use std::fmt;

use crate::types::EntityKind;

/// Errors that can occur during storage operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StorageError {
    /// The requested record was not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of record that was not found.
        entity: EntityKind,
        /// The id that was looked up.
        id: String,
    },

    /// A uniqueness constraint would be violated.
    #[error("Unique constraint violated on {entity}.{field}: {value} already exists")]
    UniqueViolation {
        /// The kind of record being written.
        entity: EntityKind,
        /// The field (or composite key) that must be unique.
        field: &'static str,
        /// The conflicting value.
        value: String,
    },

    /// A foreign key references a record that does not exist.
    #[error("Foreign key violated on {entity}.{field}: {target} {value} does not exist")]
    ForeignKeyViolation {
        /// The kind of record being written.
        entity: EntityKind,
        /// The referencing field.
        field: &'static str,
        /// The kind of record the field points at.
        target: EntityKind,
        /// The dangling value.
        value: String,
    },

    /// A multi-step write could not complete and was rolled back.
    #[error("Transaction error: {message}")]
    TransactionError {
        /// Description of the transaction error.
        message: String,
    },

    /// An internal storage error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl StorageError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(entity: EntityKind, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Creates a new `UniqueViolation` error.
    #[must_use]
    pub fn unique_violation(entity: EntityKind, field: &'static str, value: impl ToString) -> Self {
        Self::UniqueViolation {
            entity,
            field,
            value: value.to_string(),
        }
    }

    /// Creates a new `ForeignKeyViolation` error.
    #[must_use]
    pub fn foreign_key_violation(
        entity: EntityKind,
        field: &'static str,
        target: EntityKind,
        value: impl ToString,
    ) -> Self {
        Self::ForeignKeyViolation {
            entity,
            field,
            target,
            value: value.to_string(),
        }
    }

    /// Creates a new `TransactionError` error.
    #[must_use]
    pub fn transaction_error(message: impl Into<String>) -> Self {
        Self::TransactionError {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if this is a uniqueness or foreign key violation.
    #[must_use]
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            Self::UniqueViolation { .. } | Self::ForeignKeyViolation { .. }
        )
    }

    /// Returns the error category for logging and error codes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::UniqueViolation { .. } | Self::ForeignKeyViolation { .. } => {
                ErrorCategory::Constraint
            }
            Self::TransactionError { .. } => ErrorCategory::Transaction,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Categories of storage errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Record not found.
    NotFound,
    /// Uniqueness or foreign key violation.
    Constraint,
    /// Transaction-related error.
    Transaction,
    /// Internal error.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Constraint => write!(f, "constraint"),
            Self::Transaction => write!(f, "transaction"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
