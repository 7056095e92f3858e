// Insurers, their plans, plan coverage rules and negotiated tariffs
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{CoverageKind, PlanTier};
use crate::audit::AuditInfo;
use crate::entity::{Entity, UniqueKey};
use crate::query::{FieldKind, FieldValue};

/// True when `date` falls in the closed range `[from, to]`; an open end means no limit
pub fn date_in_range(date: NaiveDate, from: NaiveDate, to: Option<NaiveDate>) -> bool {
    date >= from && to.map_or(true, |to| date <= to)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct InsuranceProvider {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub kind: CoverageKind,
    pub phone: Option<String>,
    pub is_active: bool,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditInfo,
}

impl Entity for InsuranceProvider {
    const TABLE: &'static str = "insurance_providers";
    const RESOURCE: &'static str = "insurance provider";
    const COLUMNS: &'static [&'static str] = &["code", "name", "kind", "phone", "is_active"];
    const SEARCH_FIELDS: &'static [&'static str] = &["code", "name"];
    const FILTER_FIELDS: &'static [(&'static str, FieldKind)] = &[
        ("code", FieldKind::Text),
        ("kind", FieldKind::Text),
        ("is_active", FieldKind::Bool),
    ];
    const SORT_FIELDS: &'static [&'static str] = &["created_at", "updated_at", "code", "name"];
    const UNIQUE_KEYS: &'static [UniqueKey] = &[UniqueKey::live(&["code"])];

    fn id(&self) -> Uuid {
        self.id
    }

    fn audit(&self) -> &AuditInfo {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "code" => self.code.clone().into(),
            "name" => self.name.clone().into(),
            "kind" => self.kind.into(),
            "phone" => self.phone.clone().into(),
            "is_active" => self.is_active.into(),
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct InsurancePlan {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub tier: PlanTier,
    /// Share of the amount after deductible paid by the insurer, 0..=100
    pub default_coverage_percent: Decimal,
    pub deductible_percent: Decimal,
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
    pub is_active: bool,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditInfo,
}

impl InsurancePlan {
    pub fn is_effective_on(&self, date: NaiveDate) -> bool {
        self.audit.is_live() && self.is_active && date_in_range(date, self.effective_from, self.effective_to)
    }
}

impl Entity for InsurancePlan {
    const TABLE: &'static str = "insurance_plans";
    const RESOURCE: &'static str = "insurance plan";
    const COLUMNS: &'static [&'static str] = &[
        "provider_id",
        "name",
        "tier",
        "default_coverage_percent",
        "deductible_percent",
        "effective_from",
        "effective_to",
        "is_active",
    ];
    const SEARCH_FIELDS: &'static [&'static str] = &["name"];
    const FILTER_FIELDS: &'static [(&'static str, FieldKind)] = &[
        ("provider_id", FieldKind::Uuid),
        ("tier", FieldKind::Text),
        ("is_active", FieldKind::Bool),
    ];
    const SORT_FIELDS: &'static [&'static str] =
        &["created_at", "updated_at", "name", "effective_from"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn audit(&self) -> &AuditInfo {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "provider_id" => self.provider_id.into(),
            "name" => self.name.clone().into(),
            "tier" => self.tier.into(),
            "default_coverage_percent" => self.default_coverage_percent.into(),
            "deductible_percent" => self.deductible_percent.into(),
            "effective_from" => self.effective_from.into(),
            "effective_to" => self.effective_to.into(),
            "is_active" => self.is_active.into(),
            _ => return None,
        })
    }
}

/// Coverage rule of a plan for one service category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PlanService {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub category_id: Uuid,
    pub is_covered: bool,
    /// Overrides the plan's default coverage percent
    pub coverage_percent: Option<Decimal>,
    /// Fixed amount the patient pays per unit
    pub copay_amount: Option<Decimal>,
    /// Insurer pays at most this much per unit
    pub max_coverage_amount: Option<Decimal>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditInfo,
}

impl Entity for PlanService {
    const TABLE: &'static str = "plan_services";
    const RESOURCE: &'static str = "plan service";
    const COLUMNS: &'static [&'static str] = &[
        "plan_id",
        "category_id",
        "is_covered",
        "coverage_percent",
        "copay_amount",
        "max_coverage_amount",
    ];
    const SEARCH_FIELDS: &'static [&'static str] = &[];
    const FILTER_FIELDS: &'static [(&'static str, FieldKind)] = &[
        ("plan_id", FieldKind::Uuid),
        ("category_id", FieldKind::Uuid),
        ("is_covered", FieldKind::Bool),
    ];
    const SORT_FIELDS: &'static [&'static str] = &["created_at", "updated_at", "coverage_percent"];
    const UNIQUE_KEYS: &'static [UniqueKey] = &[UniqueKey::live(&["plan_id", "category_id"])];

    fn id(&self) -> Uuid {
        self.id
    }

    fn audit(&self) -> &AuditInfo {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "plan_id" => self.plan_id.into(),
            "category_id" => self.category_id.into(),
            "is_covered" => self.is_covered.into(),
            "coverage_percent" => self.coverage_percent.into(),
            "copay_amount" => self.copay_amount.into(),
            "max_coverage_amount" => self.max_coverage_amount.into(),
            _ => return None,
        })
    }
}

/// Negotiated price of a service under a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct InsuranceTariff {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub service_id: Uuid,
    pub total_price: Decimal,
    /// Fixed insurer share per unit; the rest is the patient's
    pub insurer_share: Option<Decimal>,
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditInfo,
}

impl InsuranceTariff {
    pub fn is_effective_on(&self, date: NaiveDate) -> bool {
        self.audit.is_live() && date_in_range(date, self.effective_from, self.effective_to)
    }

    pub fn patient_share(&self) -> Option<Decimal> {
        self.insurer_share.map(|share| self.total_price - share)
    }
}

impl Entity for InsuranceTariff {
    const TABLE: &'static str = "insurance_tariffs";
    const RESOURCE: &'static str = "insurance tariff";
    const COLUMNS: &'static [&'static str] = &[
        "plan_id",
        "service_id",
        "total_price",
        "insurer_share",
        "effective_from",
        "effective_to",
    ];
    const SEARCH_FIELDS: &'static [&'static str] = &[];
    const FILTER_FIELDS: &'static [(&'static str, FieldKind)] = &[
        ("plan_id", FieldKind::Uuid),
        ("service_id", FieldKind::Uuid),
    ];
    const SORT_FIELDS: &'static [&'static str] =
        &["created_at", "updated_at", "effective_from", "total_price"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn audit(&self) -> &AuditInfo {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "plan_id" => self.plan_id.into(),
            "service_id" => self.service_id.into(),
            "total_price" => self.total_price.into(),
            "insurer_share" => self.insurer_share.into(),
            "effective_from" => self.effective_from.into(),
            "effective_to" => self.effective_to.into(),
            _ => return None,
        })
    }
}

/// A patient's enrolment in a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PatientInsurance {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub plan_id: Uuid,
    pub policy_number: String,
    #[sqlx(try_from = "String")]
    pub kind: CoverageKind,
    /// Lower value wins when several insurances of a kind are valid
    pub priority: i32,
    pub valid_from: NaiveDate,
    pub valid_to: Option<NaiveDate>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditInfo,
}

impl PatientInsurance {
    pub fn is_valid_on(&self, date: NaiveDate) -> bool {
        self.audit.is_live() && date_in_range(date, self.valid_from, self.valid_to)
    }
}

impl Entity for PatientInsurance {
    const TABLE: &'static str = "patient_insurances";
    const RESOURCE: &'static str = "patient insurance";
    const COLUMNS: &'static [&'static str] = &[
        "patient_id",
        "plan_id",
        "policy_number",
        "kind",
        "priority",
        "valid_from",
        "valid_to",
    ];
    const SEARCH_FIELDS: &'static [&'static str] = &["policy_number"];
    const FILTER_FIELDS: &'static [(&'static str, FieldKind)] = &[
        ("patient_id", FieldKind::Uuid),
        ("plan_id", FieldKind::Uuid),
        ("kind", FieldKind::Text),
    ];
    const SORT_FIELDS: &'static [&'static str] =
        &["created_at", "updated_at", "priority", "valid_from"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn audit(&self) -> &AuditInfo {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "patient_id" => self.patient_id.into(),
            "plan_id" => self.plan_id.into(),
            "policy_number" => self.policy_number.clone().into(),
            "kind" => self.kind.into(),
            "priority" => self.priority.into(),
            "valid_from" => self.valid_from.into(),
            "valid_to" => self.valid_to.into(),
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let from = date(2024, 3, 20);
        let to = Some(date(2025, 3, 20));
        assert!(date_in_range(from, from, to));
        assert!(date_in_range(date(2025, 3, 20), from, to));
        assert!(!date_in_range(date(2025, 3, 21), from, to));
        assert!(!date_in_range(date(2024, 3, 19), from, None));
        assert!(date_in_range(date(2030, 1, 1), from, None));
    }

    #[test]
    fn test_deleted_tariff_is_never_effective() {
        let mut tariff = InsuranceTariff {
            id: Uuid::new_v4(),
            plan_id: Uuid::new_v4(),
            service_id: Uuid::new_v4(),
            total_price: Decimal::from(1_000_000),
            insurer_share: Some(Decimal::from(700_000)),
            effective_from: date(2024, 1, 1),
            effective_to: None,
            audit: AuditInfo::default(),
        };
        assert!(tariff.is_effective_on(date(2024, 6, 1)));
        assert_eq!(tariff.patient_share(), Some(Decimal::from(300_000)));

        tariff.audit.mark_deleted(None, chrono::Utc::now());
        assert!(!tariff.is_effective_on(date(2024, 6, 1)));
    }
}
