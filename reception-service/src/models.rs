use billing_service::Balance;
use chrono::{DateTime, NaiveDate, Utc};
use database_layer::{
    Doctor, Gender, InsuranceCalculation, MedicalService, Patient, Payment, Reception,
    ReceptionService, ReceptionStatus,
};
use insurance_service::ResolvedCoverage;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

fn default_true() -> bool {
    true
}

fn default_quantity() -> i32 {
    1
}

/// Patient fields accepted on registration and update
///
/// The file number is assigned by the clinic and cannot be supplied.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PatientInput {
    pub first_name: String,
    pub last_name: String,
    pub father_name: Option<String>,
    /// Persian digits are accepted
    pub national_code: String,
    pub birth_date: Option<NaiveDate>,
    pub gender: Gender,
    pub mobile: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DoctorInput {
    pub first_name: String,
    pub last_name: String,
    pub medical_council_code: String,
    pub specialty: String,
    pub mobile: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceCategoryInput {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MedicalServiceInput {
    pub category_id: Uuid,
    pub code: String,
    pub name: String,
    /// List price in Rials
    pub base_price: Decimal,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// A new visit
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReceptionInput {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    /// Defaults to now
    pub received_at: Option<DateTime<Utc>>,
    /// Use this insurance instead of resolving one
    pub primary_insurance_id: Option<Uuid>,
    pub supplementary_insurance_id: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddServiceInput {
    pub service_id: Uuid,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct StatusChange {
    pub status: ReceptionStatus,
}

/// A service line with its catalogue entry and live calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReceptionLine {
    pub line: ReceptionService,
    pub service: MedicalService,
    pub calculation: Option<InsuranceCalculation>,
}

/// Everything the reception screens show about one visit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReceptionDetails {
    pub reception: Reception,
    pub patient: Patient,
    pub doctor: Doctor,
    pub coverage: ResolvedCoverage,
    pub lines: Vec<ReceptionLine>,
    pub payments: Vec<Payment>,
    pub balance: Balance,
}

impl ReceptionDetails {
    pub fn calculations(&self) -> impl Iterator<Item = &InsuranceCalculation> {
        self.lines.iter().filter_map(|line| line.calculation.as_ref())
    }

    pub fn base_total(&self) -> Decimal {
        self.lines.iter().map(|line| line.line.total_price).sum()
    }

    pub fn primary_total(&self) -> Decimal {
        self.calculations().map(|c| c.primary_share).sum()
    }
}
