use std::fmt;
use serde::{Deserialize, Serialize};
use serde_json::json;
use crate::errors::{DomainError, RepositoryError, ServiceError, ValidationError};

/// Error codes for FFI boundary
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Success (no error)
    Success = 0,

    // General errors (1-99)
    InvalidArgument = 2,
    NullPointer = 3,
    InvalidUtf8 = 4,
    InternalError = 6,

    // Repository errors (100-199)
    RecordConflict = 102,

    // Domain errors (200-299)
    EntityNotFound = 201,
    ValidationFailed = 204,

    // Service errors (300-399)
    ConfigurationError = 310,
    TaskRejected = 312,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, *self as i32)
    }
}

/// Error type for FFI boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FFIError {
    /// Error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details (JSON string)
    pub details: Option<String>,
}

impl fmt::Display for FFIError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(details) = &self.details {
            write!(f, "{}: {} ({})", self.code, self.message, details)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl std::error::Error for FFIError {}

impl FFIError {
    pub fn new(code: ErrorCode, message: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, message: &str, details: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
            details: Some(details.to_string()),
        }
    }

    pub fn invalid_argument(message: &str) -> Self {
        Self::new(ErrorCode::InvalidArgument, message)
    }

    pub fn null_pointer(name: &str) -> Self {
        Self::new(ErrorCode::NullPointer, &format!("null pointer: {}", name))
    }

    pub fn internal(message: String) -> Self {
        Self::new(ErrorCode::InternalError, &message)
    }
}

impl From<RepositoryError> for FFIError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(msg) => Self::new(ErrorCode::RecordConflict, &msg),
        }
    }
}

impl From<DomainError> for FFIError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidArgument(msg) => Self::new(ErrorCode::InvalidArgument, &msg),
            DomainError::Repository(repo_err) => repo_err.into(),
            DomainError::EntityNotFound(entity, id) => Self::with_details(
                ErrorCode::EntityNotFound,
                &format!("Entity not found: {} with ID {}", entity, id),
                &json!({ "entity": entity, "id": id.to_string() }).to_string(),
            ),
            DomainError::Validation(val_err) => val_err.into(),
        }
    }
}

impl From<ServiceError> for FFIError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(domain_err) => domain_err.into(),
            ServiceError::TaskRejected(msg) => Self::new(ErrorCode::TaskRejected, &msg),
            ServiceError::Configuration(msg) => Self::new(ErrorCode::ConfigurationError, &msg),
        }
    }
}

impl From<ValidationError> for FFIError {
    fn from(err: ValidationError) -> Self {
        let message = err.to_string();
        let details = match &err {
            ValidationError::Required { field } => json!({ "field": field, "type": "required" }),
            ValidationError::MinLength { field, min } => {
                json!({ "field": field, "type": "min_length", "min": min })
            }
            ValidationError::MaxLength { field, max } => {
                json!({ "field": field, "type": "max_length", "max": max })
            }
            ValidationError::Range { field, min, max } => {
                json!({ "field": field, "type": "range", "min": min, "max": max })
            }
            ValidationError::Format { field, reason } => {
                json!({ "field": field, "type": "format", "reason": reason })
            }
            ValidationError::Custom(msg) => json!({ "type": "custom", "message": msg }),
        };
        Self::with_details(ErrorCode::ValidationFailed, &message, &details.to_string())
    }
}

impl From<std::ffi::NulError> for FFIError {
    fn from(_: std::ffi::NulError) -> Self {
        Self::new(ErrorCode::InvalidUtf8, "String contains null bytes, cannot create CString")
    }
}

/// Result type alias for FFI functions
pub type FFIResult<T> = Result<T, FFIError>;
