use database_layer::DatabaseError;
use error_common::{codes, ClinicError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BillingError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// The payment or refund breaks a balance rule
    #[error("Payment rejected: {0}")]
    PaymentRejected(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl BillingError {
    pub fn code(&self) -> &'static str {
        match self {
            BillingError::Validation(_) => codes::validation::INVALID_INPUT,
            BillingError::PaymentRejected(_) => codes::business::PAYMENT_REJECTED,
            BillingError::Database(e) => e.code(),
        }
    }
}

impl From<BillingError> for ClinicError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::Validation(msg) => ClinicError::ValidationError(msg),
            BillingError::PaymentRejected(_) => ClinicError::BusinessError(err.to_string()),
            BillingError::Database(e) => e.into(),
        }
    }
}

pub type BillingResult<T> = Result<T, BillingError>;
