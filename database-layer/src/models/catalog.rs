// Doctors and the priced service catalogue
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::audit::AuditInfo;
use crate::entity::{Entity, UniqueKey};
use crate::query::{FieldKind, FieldValue};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Doctor {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    /// Medical council registration number
    pub medical_council_code: String,
    pub specialty: String,
    pub mobile: Option<String>,
    pub is_active: bool,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditInfo,
}

impl Doctor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

impl Entity for Doctor {
    const TABLE: &'static str = "doctors";
    const RESOURCE: &'static str = "doctor";
    const COLUMNS: &'static [&'static str] = &[
        "first_name",
        "last_name",
        "medical_council_code",
        "specialty",
        "mobile",
        "is_active",
    ];
    const SEARCH_FIELDS: &'static [&'static str] =
        &["first_name", "last_name", "medical_council_code", "specialty"];
    const FILTER_FIELDS: &'static [(&'static str, FieldKind)] = &[
        ("medical_council_code", FieldKind::Text),
        ("specialty", FieldKind::Text),
        ("is_active", FieldKind::Bool),
    ];
    const SORT_FIELDS: &'static [&'static str] =
        &["created_at", "updated_at", "last_name", "specialty"];
    const UNIQUE_KEYS: &'static [UniqueKey] = &[UniqueKey::live(&["medical_council_code"])];

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
            "first_name" => self.first_name.clone().into(),
            "last_name" => self.last_name.clone().into(),
            "medical_council_code" => self.medical_council_code.clone().into(),
            "specialty" => self.specialty.clone().into(),
            "mobile" => self.mobile.clone().into(),
            "is_active" => self.is_active.into(),
            _ => return None,
        })
    }
}

/// Grouping of services that insurance plans cover as a unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ServiceCategory {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditInfo,
}

impl Entity for ServiceCategory {
    const TABLE: &'static str = "service_categories";
    const RESOURCE: &'static str = "service category";
    const COLUMNS: &'static [&'static str] = &["code", "name"];
    const SEARCH_FIELDS: &'static [&'static str] = &["code", "name"];
    const FILTER_FIELDS: &'static [(&'static str, FieldKind)] = &[("code", FieldKind::Text)];
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
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MedicalService {
    pub id: Uuid,
    pub category_id: Uuid,
    pub code: String,
    pub name: String,
    /// List price in Rials, used when no tariff applies
    pub base_price: Decimal,
    pub is_active: bool,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditInfo,
}

impl Entity for MedicalService {
    const TABLE: &'static str = "medical_services";
    const RESOURCE: &'static str = "medical service";
    const COLUMNS: &'static [&'static str] = &["category_id", "code", "name", "base_price", "is_active"];
    const SEARCH_FIELDS: &'static [&'static str] = &["code", "name"];
    const FILTER_FIELDS: &'static [(&'static str, FieldKind)] = &[
        ("category_id", FieldKind::Uuid),
        ("code", FieldKind::Text),
        ("is_active", FieldKind::Bool),
    ];
    const SORT_FIELDS: &'static [&'static str] =
        &["created_at", "updated_at", "code", "name", "base_price"];
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
            "category_id" => self.category_id.into(),
            "code" => self.code.clone().into(),
            "name" => self.name.clone().into(),
            "base_price" => self.base_price.into(),
            "is_active" => self.is_active.into(),
            _ => return None,
        })
    }
}
