// Receptions, their service lines and per-line insurance calculations
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::ReceptionStatus;
use crate::audit::AuditInfo;
use crate::entity::{Entity, UniqueKey};
use crate::query::{FieldKind, FieldValue};

/// A patient's registration for a visit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Reception {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    /// Jalali date digits followed by a 4-digit daily sequence
    pub reception_number: String,
    /// Clinic-local (Tehran) calendar day of `received_at`
    pub reception_day: NaiveDate,
    pub received_at: DateTime<Utc>,
    #[sqlx(try_from = "String")]
    pub status: ReceptionStatus,
    pub primary_insurance_id: Option<Uuid>,
    pub supplementary_insurance_id: Option<Uuid>,
    pub notes: Option<String>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditInfo,
}

impl Entity for Reception {
    const TABLE: &'static str = "receptions";
    const RESOURCE: &'static str = "reception";
    const COLUMNS: &'static [&'static str] = &[
        "patient_id",
        "doctor_id",
        "reception_number",
        "reception_day",
        "received_at",
        "status",
        "primary_insurance_id",
        "supplementary_insurance_id",
        "notes",
    ];
    const SEARCH_FIELDS: &'static [&'static str] = &["reception_number", "notes"];
    const FILTER_FIELDS: &'static [(&'static str, FieldKind)] = &[
        ("patient_id", FieldKind::Uuid),
        ("doctor_id", FieldKind::Uuid),
        ("status", FieldKind::Text),
        ("reception_day", FieldKind::Date),
        ("reception_number", FieldKind::Text),
    ];
    const SORT_FIELDS: &'static [&'static str] = &[
        "created_at",
        "updated_at",
        "received_at",
        "reception_day",
        "reception_number",
    ];
    const UNIQUE_KEYS: &'static [UniqueKey] = &[UniqueKey::always(&["reception_number"])];

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
            "doctor_id" => self.doctor_id.into(),
            "reception_number" => self.reception_number.clone().into(),
            "reception_day" => self.reception_day.into(),
            "received_at" => self.received_at.into(),
            "status" => self.status.into(),
            "primary_insurance_id" => self.primary_insurance_id.into(),
            "supplementary_insurance_id" => self.supplementary_insurance_id.into(),
            "notes" => self.notes.clone().into(),
            _ => return None,
        })
    }
}

/// One service line of a reception
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ReceptionService {
    pub id: Uuid,
    pub reception_id: Uuid,
    pub service_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditInfo,
}

impl Entity for ReceptionService {
    const TABLE: &'static str = "reception_services";
    const RESOURCE: &'static str = "reception service";
    const COLUMNS: &'static [&'static str] =
        &["reception_id", "service_id", "quantity", "unit_price", "total_price"];
    const SEARCH_FIELDS: &'static [&'static str] = &[];
    const FILTER_FIELDS: &'static [(&'static str, FieldKind)] = &[
        ("reception_id", FieldKind::Uuid),
        ("service_id", FieldKind::Uuid),
    ];
    const SORT_FIELDS: &'static [&'static str] = &["created_at", "updated_at", "total_price"];

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
            "reception_id" => self.reception_id.into(),
            "service_id" => self.service_id.into(),
            "quantity" => self.quantity.into(),
            "unit_price" => self.unit_price.into(),
            "total_price" => self.total_price.into(),
            _ => return None,
        })
    }
}

/// Split of one service line between insurers and the patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct InsuranceCalculation {
    pub id: Uuid,
    pub reception_id: Uuid,
    pub reception_service_id: Uuid,
    pub primary_plan_id: Option<Uuid>,
    pub supplementary_plan_id: Option<Uuid>,
    pub base_amount: Decimal,
    pub primary_share: Decimal,
    pub supplementary_share: Decimal,
    pub patient_share: Decimal,
    pub deductible_amount: Decimal,
    pub calculated_at: DateTime<Utc>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditInfo,
}

impl InsuranceCalculation {
    pub fn insurer_total(&self) -> Decimal {
        self.primary_share + self.supplementary_share
    }
}

impl Entity for InsuranceCalculation {
    const TABLE: &'static str = "insurance_calculations";
    const RESOURCE: &'static str = "insurance calculation";
    const COLUMNS: &'static [&'static str] = &[
        "reception_id",
        "reception_service_id",
        "primary_plan_id",
        "supplementary_plan_id",
        "base_amount",
        "primary_share",
        "supplementary_share",
        "patient_share",
        "deductible_amount",
        "calculated_at",
    ];
    const SEARCH_FIELDS: &'static [&'static str] = &[];
    const FILTER_FIELDS: &'static [(&'static str, FieldKind)] = &[
        ("reception_id", FieldKind::Uuid),
        ("reception_service_id", FieldKind::Uuid),
        ("primary_plan_id", FieldKind::Uuid),
        ("supplementary_plan_id", FieldKind::Uuid),
    ];
    const SORT_FIELDS: &'static [&'static str] = &["created_at", "updated_at", "calculated_at"];

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
            "reception_id" => self.reception_id.into(),
            "reception_service_id" => self.reception_service_id.into(),
            "primary_plan_id" => self.primary_plan_id.into(),
            "supplementary_plan_id" => self.supplementary_plan_id.into(),
            "base_amount" => self.base_amount.into(),
            "primary_share" => self.primary_share.into(),
            "supplementary_share" => self.supplementary_share.into(),
            "patient_share" => self.patient_share.into(),
            "deductible_amount" => self.deductible_amount.into(),
            "calculated_at" => self.calculated_at.into(),
            _ => return None,
        })
    }
}
