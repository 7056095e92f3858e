use chrono::NaiveDate;
use database_layer::{
    CoverageKind, InsurancePlan, InsuranceProvider, InsuranceTariff, MedicalService,
    PatientInsurance, PlanService, PlanTier,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

fn default_true() -> bool {
    true
}

fn default_priority() -> i32 {
    1
}

/// Insurer fields accepted on create and update
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProviderInput {
    pub code: String,
    pub name: String,
    pub kind: CoverageKind,
    pub phone: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlanInput {
    pub provider_id: Uuid,
    pub name: String,
    pub tier: PlanTier,
    pub default_coverage_percent: Decimal,
    #[serde(default)]
    pub deductible_percent: Decimal,
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlanServiceInput {
    pub plan_id: Uuid,
    pub category_id: Uuid,
    #[serde(default = "default_true")]
    pub is_covered: bool,
    pub coverage_percent: Option<Decimal>,
    pub copay_amount: Option<Decimal>,
    pub max_coverage_amount: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TariffInput {
    pub plan_id: Uuid,
    pub service_id: Uuid,
    pub total_price: Decimal,
    pub insurer_share: Option<Decimal>,
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
}

/// Enrolment of a patient in a plan; the patient comes from the URL
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PatientInsuranceInput {
    pub plan_id: Uuid,
    pub policy_number: String,
    pub kind: CoverageKind,
    #[serde(default = "default_priority")]
    pub priority: i32,
    pub valid_from: NaiveDate,
    pub valid_to: Option<NaiveDate>,
}

/// An insurance chosen for a visit, with the plan and insurer behind it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AppliedInsurance {
    pub insurance: PatientInsurance,
    pub plan: InsurancePlan,
    pub provider: InsuranceProvider,
}

/// Insurances that apply to a visit on a given day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ResolvedCoverage {
    pub primary: Option<AppliedInsurance>,
    pub supplementary: Option<AppliedInsurance>,
}

impl ResolvedCoverage {
    pub fn primary_insurance_id(&self) -> Option<Uuid> {
        self.primary.as_ref().map(|applied| applied.insurance.id)
    }

    pub fn supplementary_insurance_id(&self) -> Option<Uuid> {
        self.supplementary.as_ref().map(|applied| applied.insurance.id)
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_none() && self.supplementary.is_none()
    }
}

/// What the calculator needs to know about one plan for one line
#[derive(Debug, Clone)]
pub struct CoverageSlot {
    pub plan: InsurancePlan,
    /// Live rule for the service's category, if the plan has one
    pub plan_service: Option<PlanService>,
    /// Tariff effective on the visit day, if any
    pub tariff: Option<InsuranceTariff>,
}

/// Outcome of applying one plan to a line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SlotShare {
    pub plan_id: Uuid,
    pub is_covered: bool,
    /// Percent of the amount the insurer ends up paying
    pub coverage_percent: Decimal,
    pub deductible: Decimal,
    pub share: Decimal,
}

/// Split of a priced line between insurers and the patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LineCoverage {
    pub quantity: i32,
    pub unit_price: Decimal,
    pub base_amount: Decimal,
    pub primary: Option<SlotShare>,
    pub supplementary: Option<SlotShare>,
    pub primary_share: Decimal,
    pub supplementary_share: Decimal,
    pub patient_share: Decimal,
    pub deductible_amount: Decimal,
}

impl LineCoverage {
    pub fn insurer_total(&self) -> Decimal {
        self.primary_share + self.supplementary_share
    }
}

/// Unsaved calculation for a patient, service and day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CoveragePreview {
    pub on_date: NaiveDate,
    pub service: MedicalService,
    pub coverage: ResolvedCoverage,
    pub line: LineCoverage,
}
