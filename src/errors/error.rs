use std::fmt;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by a beneficiary data source
#[derive(Debug, Error, Clone, Serialize)]
pub enum RepositoryError {
    #[error("Conflict error: {0}")]
    Conflict(String),
}

/// Domain-level errors
#[derive(Debug, Error, Clone, Serialize)]
pub enum DomainError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Entity not found: {0} with ID {1}")]
    EntityNotFound(String, Uuid),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl DomainError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        DomainError::InvalidArgument(message.into())
    }
}

/// Service-level errors (application specific)
#[derive(Debug, Error, Clone, Serialize)]
pub enum ServiceError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Distribution task rejected: {0}")]
    TaskRejected(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        ServiceError::Domain(DomainError::Repository(err))
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Domain(DomainError::Validation(err))
    }
}

/// Validation errors
#[derive(Debug, Error, Clone, Serialize, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Field '{field}' is required")]
    Required {
        field: String,
    },

    #[error("Field '{field}' must be at least {min} characters")]
    MinLength {
        field: String,
        min: usize,
    },

    #[error("Field '{field}' cannot exceed {max} characters")]
    MaxLength {
        field: String,
        max: usize,
    },

    #[error("Field '{field}' must be between {min} and {max}")]
    Range {
        field: String,
        min: String,
        max: String,
    },

    #[error("Field '{field}' contains invalid format: {reason}")]
    Format {
        field: String,
        reason: String,
    },

    #[error("Validation error: {0}")]
    Custom(String),
}

impl ValidationError {
    pub fn required(field: &str) -> Self {
        Self::Required {
            field: field.to_string(),
        }
    }

    pub fn min_length(field: &str, min: usize) -> Self {
        Self::MinLength {
            field: field.to_string(),
            min,
        }
    }

    pub fn max_length(field: &str, max: usize) -> Self {
        Self::MaxLength {
            field: field.to_string(),
            max,
        }
    }

    pub fn range<T: fmt::Display>(field: &str, min: T, max: T) -> Self {
        Self::Range {
            field: field.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }

    pub fn format(field: &str, reason: &str) -> Self {
        Self::Format {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn custom(message: &str) -> Self {
        Self::Custom(message.to_string())
    }
}
