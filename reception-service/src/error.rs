use billing_service::BillingError;
use database_layer::{DatabaseError, ReceptionStatus};
use error_common::{codes, ClinicError};
use insurance_service::InsuranceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReceptionError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Cannot move reception from {from} to {to}: {reason}")]
    InvalidTransition {
        from: ReceptionStatus,
        to: ReceptionStatus,
        reason: String,
    },

    /// The reception's state forbids the change
    #[error("Reception is locked: {0}")]
    Locked(String),

    #[error(transparent)]
    Insurance(#[from] InsuranceError),

    #[error(transparent)]
    Billing(#[from] BillingError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl ReceptionError {
    pub fn transition(
        from: ReceptionStatus,
        to: ReceptionStatus,
        reason: impl Into<String>,
    ) -> Self {
        ReceptionError::InvalidTransition {
            from,
            to,
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ReceptionError::Validation(_) => codes::validation::INVALID_INPUT,
            ReceptionError::Conflict(_) => codes::database::CONSTRAINT_VIOLATION,
            ReceptionError::InvalidTransition { .. } => codes::business::INVALID_TRANSITION,
            ReceptionError::Locked(_) => codes::business::RULE_VIOLATION,
            ReceptionError::Insurance(e) => e.code(),
            ReceptionError::Billing(e) => e.code(),
            ReceptionError::Database(e) => e.code(),
        }
    }
}

impl From<ReceptionError> for ClinicError {
    fn from(err: ReceptionError) -> Self {
        match err {
            ReceptionError::Validation(msg) => ClinicError::ValidationError(msg),
            ReceptionError::Conflict(msg) => ClinicError::Conflict(msg),
            ReceptionError::InvalidTransition { .. } | ReceptionError::Locked(_) => {
                ClinicError::BusinessError(err.to_string())
            }
            ReceptionError::Insurance(e) => e.into(),
            ReceptionError::Billing(e) => e.into(),
            ReceptionError::Database(e) => e.into(),
        }
    }
}

pub type ReceptionResult<T> = Result<T, ReceptionError>;

#[cfg(test)]
mod tests {
    use super::*;
    use error_common::ErrorCategory;

    #[test]
    fn test_transition_error_is_a_business_error() {
        let err = ReceptionError::transition(
            ReceptionStatus::Completed,
            ReceptionStatus::Registered,
            "completed receptions are final",
        );
        assert_eq!(err.code(), codes::business::INVALID_TRANSITION);
        assert_eq!(
            err.to_string(),
            "Cannot move reception from completed to registered: completed receptions are final"
        );
        assert_eq!(ClinicError::from(err).category(), ErrorCategory::Business);
    }

    #[test]
    fn test_nested_errors_keep_their_codes() {
        let err = ReceptionError::from(BillingError::PaymentRejected("too much".into()));
        assert_eq!(err.code(), codes::business::PAYMENT_REJECTED);
        let err = ReceptionError::from(DatabaseError::not_found("patient", uuid::Uuid::nil()));
        assert_eq!(ClinicError::from(err).category(), ErrorCategory::NotFound);
    }
}
