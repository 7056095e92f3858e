//! Billing for clinic receptions
//!
//! Tracks what the patient owes for a reception (the patient shares of its
//! insurance calculations) against the payments and refunds recorded on it.
//! Every payment gets a receipt number derived from the reception number.

pub mod error;
pub mod models;
pub mod payment;
pub mod service;

pub use error::{BillingError, BillingResult};
pub use models::{Balance, PaymentInput};
pub use payment::receipt_number;
pub use service::BillingService;
