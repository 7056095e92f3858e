//! Request validation for payloads the domain services do not check
//! themselves
//!
//! Domain inputs (patients, plans, payments...) are validated by their
//! services. Request types that exist only at the HTTP edge implement
//! [`RequestValidation`] with the macros below.

use crate::error::ApiError;

/// Trait for validating request payloads
pub trait RequestValidation {
    /// Returns a validation error naming the first failed rule
    fn validate(&self) -> Result<(), ApiError>;
}

/// Macro for validating fields with custom predicates
///
/// # Usage
///
/// ```rust,ignore
/// validate_field!(self.quantity, self.quantity > 0, "Quantity must be positive");
/// ```
#[macro_export]
macro_rules! validate_field {
    ($field:expr, $predicate:expr, $message:expr) => {
        if !$predicate {
            return Err($crate::error::ApiError::validation($message));
        }
    };
}

/// Macro for validating UUID fields (non-nil)
///
/// # Usage
///
/// ```rust,ignore
/// validate_uuid!(self.patient_id, "Patient ID is required");
/// ```
#[macro_export]
macro_rules! validate_uuid {
    ($field:expr, $message:expr) => {
        $crate::validate_field!($field, !$field.is_nil(), $message);
    };
}

/// Macro for validating numeric ranges (inclusive)
///
/// # Usage
///
/// ```rust,ignore
/// validate_range!(self.quantity, 1, 100, "Quantity must be between 1 and 100");
/// ```
#[macro_export]
macro_rules! validate_range {
    ($field:expr, $min:expr, $max:expr, $message:expr) => {
        $crate::validate_field!($field, ($field >= $min && $field <= $max), $message);
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    struct TestRequest {
        patient_id: Uuid,
        quantity: i32,
    }

    impl RequestValidation for TestRequest {
        fn validate(&self) -> Result<(), ApiError> {
            validate_uuid!(self.patient_id, "Patient ID is required");
            validate_range!(self.quantity, 1, 100, "Quantity must be between 1 and 100");
            Ok(())
        }
    }

    #[test]
    fn test_validation_success() {
        let request = TestRequest {
            patient_id: Uuid::new_v4(),
            quantity: 3,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_validation_nil_uuid() {
        let request = TestRequest {
            patient_id: Uuid::nil(),
            quantity: 3,
        };
        let err = request.validate().unwrap_err();
        assert!(err.to_string().contains("Patient ID is required"));
    }

    #[test]
    fn test_validation_out_of_range() {
        for quantity in [0, 101] {
            let request = TestRequest {
                patient_id: Uuid::new_v4(),
                quantity,
            };
            assert!(request.validate().is_err());
        }
    }
}
