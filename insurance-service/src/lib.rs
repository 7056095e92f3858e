//! Insurance management for clinic receptions
//!
//! - Insurers, plans (Basic / Standard / Premium), per-category plan rules
//!   and negotiated tariffs, with validation on every write
//! - Eligibility: which of a patient's insurances apply on a visit day
//! - Coverage calculation: the split of a service line between the primary
//!   insurer, the supplementary insurer and the patient
//!
//! The arithmetic lives in [`CoverageCalculator`] and is pure; everything
//! that needs stored data goes through [`InsuranceService`].

pub mod calculator;
pub mod eligibility;
pub mod error;
pub mod models;
pub mod service;

pub use calculator::CoverageCalculator;
pub use error::{InsuranceError, InsuranceResult};
pub use models::*;
pub use service::InsuranceService;
