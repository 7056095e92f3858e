use database_layer::DatabaseError;
use error_common::{codes, ClinicError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InsuranceError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A pinned or resolved insurance cannot be used for the visit
    #[error("Invalid coverage: {0}")]
    InvalidCoverage(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl InsuranceError {
    pub fn code(&self) -> &'static str {
        match self {
            InsuranceError::Validation(_) => codes::validation::INVALID_INPUT,
            InsuranceError::Conflict(_) => codes::database::CONSTRAINT_VIOLATION,
            InsuranceError::InvalidCoverage(_) => codes::business::INVALID_COVERAGE,
            InsuranceError::Database(e) => e.code(),
        }
    }
}

impl From<InsuranceError> for ClinicError {
    fn from(err: InsuranceError) -> Self {
        match err {
            InsuranceError::Validation(msg) => ClinicError::ValidationError(msg),
            InsuranceError::Conflict(msg) => ClinicError::Conflict(msg),
            InsuranceError::InvalidCoverage(_) => ClinicError::BusinessError(err.to_string()),
            InsuranceError::Database(e) => e.into(),
        }
    }
}

pub type InsuranceResult<T> = Result<T, InsuranceError>;
