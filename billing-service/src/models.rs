use chrono::{DateTime, Utc};
use database_layer::{InsuranceCalculation, Payment, PaymentMethod};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Money owed and received for one reception
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Balance {
    /// Sum of the patient shares of the live calculations
    pub patient_total: Decimal,
    pub paid: Decimal,
    pub refunded: Decimal,
    /// `paid - refunded`
    pub net_paid: Decimal,
    /// `patient_total - net_paid`; negative means the clinic owes the patient
    pub outstanding: Decimal,
}

impl Balance {
    pub fn from_records(calculations: &[InsuranceCalculation], payments: &[Payment]) -> Self {
        let patient_total = calculations
            .iter()
            .filter(|c| c.audit.is_live())
            .map(|c| c.patient_share)
            .sum();

        let (paid, refunded) = payments
            .iter()
            .filter(|p| p.audit.is_live())
            .fold((Decimal::ZERO, Decimal::ZERO), |(paid, refunded), p| {
                if p.signed_amount().is_sign_negative() {
                    (paid, refunded + p.amount)
                } else {
                    (paid + p.amount, refunded)
                }
            });

        let net_paid = paid - refunded;
        Self {
            patient_total,
            paid,
            refunded,
            net_paid,
            outstanding: patient_total - net_paid,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.outstanding.is_zero()
    }
}

/// Payment or refund request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentInput {
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub reference_number: Option<String>,
    /// Defaults to now
    pub paid_at: Option<DateTime<Utc>>,
}
