use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{PaymentKind, PaymentMethod};
use crate::audit::AuditInfo;
use crate::entity::{Entity, UniqueKey};
use crate::query::{FieldKind, FieldValue};

/// Money received from, or refunded to, the patient for a reception
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Payment {
    pub id: Uuid,
    pub reception_id: Uuid,
    pub receipt_number: String,
    #[sqlx(try_from = "String")]
    pub kind: PaymentKind,
    #[sqlx(try_from = "String")]
    pub method: PaymentMethod,
    /// Always positive; `kind` gives the direction
    pub amount: Decimal,
    pub reference_number: Option<String>,
    pub paid_at: DateTime<Utc>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditInfo,
}

impl Payment {
    /// Amount with refunds negative
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            PaymentKind::Payment => self.amount,
            PaymentKind::Refund => -self.amount,
        }
    }
}

impl Entity for Payment {
    const TABLE: &'static str = "payments";
    const RESOURCE: &'static str = "payment";
    const COLUMNS: &'static [&'static str] = &[
        "reception_id",
        "receipt_number",
        "kind",
        "method",
        "amount",
        "reference_number",
        "paid_at",
    ];
    const SEARCH_FIELDS: &'static [&'static str] = &["receipt_number", "reference_number"];
    const FILTER_FIELDS: &'static [(&'static str, FieldKind)] = &[
        ("reception_id", FieldKind::Uuid),
        ("receipt_number", FieldKind::Text),
        ("kind", FieldKind::Text),
        ("method", FieldKind::Text),
    ];
    const SORT_FIELDS: &'static [&'static str] = &["created_at", "updated_at", "paid_at", "amount"];
    const UNIQUE_KEYS: &'static [UniqueKey] = &[UniqueKey::always(&["receipt_number"])];

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
            "receipt_number" => self.receipt_number.clone().into(),
            "kind" => self.kind.into(),
            "method" => self.method.into(),
            "amount" => self.amount.into(),
            "reference_number" => self.reference_number.clone().into(),
            "paid_at" => self.paid_at.into(),
            _ => return None,
        })
    }
}
