use thiserror::Error;

use crate::codes;

/// Simplified error enum for common use cases
#[derive(Error, Debug)]
pub enum ClinicError {
    /// Network communication errors
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Server startup and runtime errors
    #[error("Server error: {0}")]
    ServerError(String),

    /// Database operation errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Requested record does not exist (or was soft deleted)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Uniqueness or state conflicts
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Business rule violations (reception workflow, payments, coverage)
    #[error("Business logic error: {0}")]
    BusinessError(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal system errors
    #[error("Internal error: {0}")]
    InternalError(String),

    /// Wrapped external errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Coarse classification used to pick HTTP status codes and log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Conflict,
    Business,
    Infrastructure,
    Internal,
}

impl ClinicError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ClinicError::ValidationError(_) => ErrorCategory::Validation,
            ClinicError::NotFound(_) => ErrorCategory::NotFound,
            ClinicError::Conflict(_) => ErrorCategory::Conflict,
            ClinicError::BusinessError(_) => ErrorCategory::Business,
            ClinicError::NetworkError(_)
            | ClinicError::DatabaseError(_)
            | ClinicError::ServerError(_) => ErrorCategory::Infrastructure,
            ClinicError::ConfigError(_) | ClinicError::InternalError(_) | ClinicError::Other(_) => {
                ErrorCategory::Internal
            }
        }
    }

    /// Stable error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            ClinicError::ValidationError(_) => codes::validation::INVALID_INPUT,
            ClinicError::NotFound(_) => codes::database::NOT_FOUND,
            ClinicError::Conflict(_) => codes::database::CONSTRAINT_VIOLATION,
            ClinicError::BusinessError(_) => codes::business::RULE_VIOLATION,
            ClinicError::DatabaseError(_) => codes::database::QUERY_FAILED,
            ClinicError::NetworkError(_) | ClinicError::ServerError(_) => codes::system::UNAVAILABLE,
            ClinicError::ConfigError(_) => codes::system::CONFIGURATION,
            ClinicError::InternalError(_) | ClinicError::Other(_) => codes::system::INTERNAL,
        }
    }
}

/// Result type alias for clinic operations
pub type Result<T> = std::result::Result<T, ClinicError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_mapping() {
        assert_eq!(
            ClinicError::ValidationError("x".into()).category(),
            ErrorCategory::Validation
        );
        assert_eq!(ClinicError::NotFound("patient".into()).category(), ErrorCategory::NotFound);
        assert_eq!(
            ClinicError::DatabaseError("down".into()).category(),
            ErrorCategory::Infrastructure
        );
        assert_eq!(
            ClinicError::Other(anyhow::anyhow!("boom")).category(),
            ErrorCategory::Internal
        );
    }

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(ClinicError::ValidationError("x".into()).code(), "VALIDATION_1001");
        assert_eq!(ClinicError::BusinessError("x".into()).code(), "BUSINESS_5001");
        assert_eq!(ClinicError::NotFound("x".into()).code(), "DB_4004");
    }
}
