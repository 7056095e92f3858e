//! Front desk of the clinic
//!
//! - Patient registry with national code validation and file numbers
//! - Doctors and the catalogue of billable services
//! - Receptions: numbering by Jalali date, service lines priced through
//!   the insurance service, and the status lifecycle
//!
//! ```text
//! registered ──> in_progress ──> completed
//!      │              │
//!      └──────────────┴──────> cancelled
//! ```
//!
//! A reception completes only when it has at least one service and the
//! patient owes nothing; it can be cancelled only when nothing is left
//! paid on it.

pub mod calendar;
mod catalog;
pub mod error;
pub mod identity;
pub mod models;
mod patients;
pub mod service;
mod workflow;

pub use calendar::{clinic_day, clinic_local, JalaliDate, TEHRAN_OFFSET_MINUTES};
pub use error::{ReceptionError, ReceptionResult};
pub use identity::{is_valid_mobile, is_valid_national_code, normalize_digits};
pub use models::*;
pub use service::ReceptionService;
pub use workflow::reception_number;
