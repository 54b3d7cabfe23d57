/// Core error types for Chorus
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type alias using `ChorusError`
pub type Result<T> = std::result::Result<T, ChorusError>;

/// Stable, machine-readable error code exposed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No valid principal where one is required
    Unauthenticated,
    /// Authenticated but lacking role, ownership or visibility
    Forbidden,
    /// Referenced entity absent or soft-deleted
    NotFound,
    /// Malformed input
    ValidationError,
    /// Uniqueness violation
    Conflict,
    /// Storage or broker failure
    InternalServerError,
}

impl ErrorCode {
    /// Wire representation of the code
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Unauthenticated => "UNAUTHENTICATED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Dotted path of the offending field
    pub field: String,
    /// Human-readable message
    pub message: String,
}

impl FieldError {
    /// Create a field error
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Core error type for Chorus
#[derive(Error, Debug)]
pub enum ChorusError {
    /// Missing or invalid credential
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Insufficient role, ownership or visibility
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Entity not found (or soft-deleted)
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Malformed input
    #[error("Validation failed: {}", summarize(.0))]
    Validation(Vec<FieldError>),

    /// Duplicate active entry or contributor
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Collection store failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Broker failure
    #[error("Broker error: {0}")]
    Broker(String),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ChorusError {
    /// Create an unauthenticated error
    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    /// Create a forbidden error
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create a single-field validation error
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a broker error
    pub fn broker(msg: impl Into<String>) -> Self {
        Self::Broker(msg.into())
    }

    /// Stable code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            ChorusError::Unauthenticated(_) => ErrorCode::Unauthenticated,
            ChorusError::Forbidden(_) => ErrorCode::Forbidden,
            ChorusError::NotFound { .. } => ErrorCode::NotFound,
            ChorusError::Validation(_) => ErrorCode::ValidationError,
            ChorusError::Conflict(_) => ErrorCode::Conflict,
            ChorusError::Storage(_) | ChorusError::Broker(_) | ChorusError::Serialization(_) => {
                ErrorCode::InternalServerError
            }
        }
    }

    /// Field-level details, if any
    pub fn fields(&self) -> &[FieldError] {
        match self {
            ChorusError::Validation(fields) => fields,
            _ => &[],
        }
    }
}

#[cfg(feature = "sqlx-support")]
impl From<sqlx::Error> for ChorusError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return Self::Conflict(db_err.message().to_string());
            }
        }
        Self::Storage(err.to_string())
    }
}
