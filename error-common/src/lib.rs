//! Common error handling utilities for the clinic engine
//!
//! This crate provides the error vocabulary shared by every service crate:
//!
//! - **`ClinicError`**: a coarse error enum used at crate boundaries and in
//!   the server binary
//! - **Error codes**: stable string codes that end up in API responses
//!
//! Service crates keep their own `thiserror` enums (`InsuranceError`,
//! `BillingError`, ...) and convert into [`ClinicError`] when they cross a
//! boundary that does not care about the specific failure.
//!
//! # Example
//!
//! ```rust
//! use error_common::{ClinicError, ErrorCategory};
//!
//! fn check_quantity(quantity: i32) -> Result<i32, ClinicError> {
//!     if quantity < 1 {
//!         return Err(ClinicError::ValidationError(
//!             "quantity must be at least 1".to_string(),
//!         ));
//!     }
//!     Ok(quantity)
//! }
//!
//! let err = check_quantity(0).unwrap_err();
//! assert_eq!(err.category(), ErrorCategory::Validation);
//! ```

pub mod types;
pub mod codes;

pub use types::*;
pub use codes::*;
