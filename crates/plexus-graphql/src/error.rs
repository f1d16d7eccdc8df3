//! Error types for GraphQL operations.
//!
//! Errors raised before execution (parse failures, depth violations) become
//! errors-only responses. Errors raised inside resolvers are converted to
//! field-level `async_graphql::Error`s carrying `extensions.code`.

use std::fmt;

use async_graphql::ErrorExtensions;
use plexus_storage::{ErrorCategory, StorageError};

/// Errors that can occur during GraphQL operations.
#[derive(Debug, Clone)]
pub enum GraphQLError {
    /// Schema build failed.
    SchemaBuildFailed(String),

    /// Invalid query syntax.
    InvalidQuery(String),

    /// Query depth exceeded.
    DepthExceeded {
        /// Response key of the offending root field.
        field: String,
        /// Measured depth of that field.
        actual: usize,
        /// Maximum allowed depth.
        max: usize,
    },

    /// Record not found on a write path.
    NotFound(String),

    /// Uniqueness or foreign key constraint violated.
    ConstraintViolation(String),

    /// A multi-step write failed and was rolled back.
    TransactionFailed(String),

    /// Storage error.
    Storage(String),

    /// Internal server error.
    Internal(String),
}

impl fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SchemaBuildFailed(msg) => {
                write!(f, "Failed to build GraphQL schema: {msg}")
            }
            Self::InvalidQuery(msg) => {
                write!(f, "Invalid GraphQL query: {msg}")
            }
            Self::DepthExceeded { field, actual, max } => {
                write!(
                    f,
                    "Field '{field}' has depth {actual}, which exceeds maximum allowed {max}"
                )
            }
            Self::NotFound(msg) => write!(f, "{msg}"),
            Self::ConstraintViolation(msg) => write!(f, "{msg}"),
            Self::TransactionFailed(msg) => {
                write!(f, "Transaction failed: {msg}")
            }
            Self::Storage(msg) => {
                write!(f, "Storage error: {msg}")
            }
            Self::Internal(msg) => {
                write!(f, "Internal error: {msg}")
            }
        }
    }
}

impl std::error::Error for GraphQLError {}

impl GraphQLError {
    /// Returns the HTTP status code for this error when it ends a request
    /// before execution.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidQuery(_) | Self::DepthExceeded { .. } => 400,
            Self::NotFound(_) => 404,
            Self::ConstraintViolation(_) => 409,
            Self::SchemaBuildFailed(_)
            | Self::TransactionFailed(_)
            | Self::Storage(_)
            | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for GraphQL error extensions.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::SchemaBuildFailed(_) => "SCHEMA_BUILD_FAILED",
            Self::InvalidQuery(_) => "INVALID_QUERY",
            Self::DepthExceeded { .. } => "DEPTH_EXCEEDED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::ConstraintViolation(_) => "CONSTRAINT_VIOLATION",
            Self::TransactionFailed(_) => "TRANSACTION_FAILED",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Renders the error as one entry of a response's `errors` array.
    #[must_use]
    pub fn to_response_error(&self) -> serde_json::Value {
        serde_json::json!({
            "message": self.to_string(),
            "extensions": { "code": self.error_code() }
        })
    }
}

impl ErrorExtensions for GraphQLError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| {
            e.set("code", self.error_code());
        })
    }
}

impl From<StorageError> for GraphQLError {
    fn from(err: StorageError) -> Self {
        let message = err.to_string();
        match err.category() {
            ErrorCategory::NotFound => Self::NotFound(message),
            ErrorCategory::Constraint => Self::ConstraintViolation(message),
            ErrorCategory::Transaction => Self::TransactionFailed(message),
            ErrorCategory::Internal => Self::Storage(message),
        }
    }
}

/// Converts a storage error to a field-level GraphQL error.
pub(crate) fn storage_error_to_graphql(error: StorageError) -> async_graphql::Error {
    GraphQLError::from(error).extend()
}
