mod error;

pub use error::{DomainError, RepositoryError, ServiceError, ValidationError};

/// Result type for data source operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
