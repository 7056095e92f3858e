// Clinic entities
mod catalog;
mod enums;
mod insurance;
mod patient;
mod payment;
mod reception;

pub use catalog::{Doctor, MedicalService, ServiceCategory};
pub use enums::{
    CoverageKind, Gender, ParseEnumError, PaymentKind, PaymentMethod, PlanTier, ReceptionStatus,
};
pub use insurance::{
    date_in_range, InsurancePlan, InsuranceProvider, InsuranceTariff, PatientInsurance, PlanService,
};
pub use patient::Patient;
pub use payment::Payment;
pub use reception::{InsuranceCalculation, Reception, ReceptionService};
