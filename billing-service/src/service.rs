use chrono::Utc;
use database_layer::{
    AuditInfo, FieldValue, InsuranceCalculation, ListQuery, Payment, PaymentKind, Reception,
    ReceptionStatus, Repositories, NUMBERING_ATTEMPTS,
};
use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{BillingError, BillingResult};
use crate::models::{Balance, PaymentInput};
use crate::payment::receipt_number;

/// Payments and refunds against receptions
#[derive(Clone)]
pub struct BillingService {
    repos: Repositories,
}

impl BillingService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Payments and refunds of a reception in the order they were made
    pub async fn payments(&self, reception_id: Uuid) -> BillingResult<Vec<Payment>> {
        let mut payments = self
            .repos
            .payments
            .find_by("reception_id", FieldValue::from(reception_id))
            .await?;
        payments.sort_by(|a, b| {
            a.paid_at
                .cmp(&b.paid_at)
                .then_with(|| a.receipt_number.cmp(&b.receipt_number))
        });
        Ok(payments)
    }

    pub async fn calculations(
        &self,
        reception_id: Uuid,
    ) -> BillingResult<Vec<InsuranceCalculation>> {
        Ok(self
            .repos
            .insurance_calculations
            .find_by("reception_id", FieldValue::from(reception_id))
            .await?)
    }

    pub async fn balance(&self, reception_id: Uuid) -> BillingResult<Balance> {
        let calculations = self.calculations(reception_id).await?;
        let payments = self.payments(reception_id).await?;
        Ok(Balance::from_records(&calculations, &payments))
    }

    /// Take money from the patient; overpaying is rejected
    pub async fn record_payment(
        &self,
        reception_id: Uuid,
        input: PaymentInput,
        actor: Option<Uuid>,
    ) -> BillingResult<Payment> {
        let reception = self.repos.receptions.get(reception_id).await?;
        check_positive(input.amount)?;
        if reception.status == ReceptionStatus::Cancelled {
            return Err(BillingError::PaymentRejected(
                "the reception is cancelled".to_string(),
            ));
        }

        let balance = self.balance(reception_id).await?;
        if input.amount > balance.outstanding {
            return Err(BillingError::PaymentRejected(format!(
                "amount {} exceeds the outstanding balance {}",
                input.amount,
                balance.outstanding.max(Decimal::ZERO)
            )));
        }

        self.store(&reception, PaymentKind::Payment, input, actor).await
    }

    /// Give money back; at most what the patient has paid so far
    pub async fn record_refund(
        &self,
        reception_id: Uuid,
        input: PaymentInput,
        actor: Option<Uuid>,
    ) -> BillingResult<Payment> {
        let reception = self.repos.receptions.get(reception_id).await?;
        check_positive(input.amount)?;

        let balance = self.balance(reception_id).await?;
        if input.amount > balance.net_paid {
            return Err(BillingError::PaymentRejected(format!(
                "refund {} exceeds the net amount paid {}",
                input.amount, balance.net_paid
            )));
        }

        self.store(&reception, PaymentKind::Refund, input, actor).await
    }

    async fn store(
        &self,
        reception: &Reception,
        kind: PaymentKind,
        input: PaymentInput,
        actor: Option<Uuid>,
    ) -> BillingResult<Payment> {
        let mut sequence = self.receipt_count(reception.id).await? + 1;
        let mut payment = Payment {
            id: Uuid::new_v4(),
            reception_id: reception.id,
            receipt_number: receipt_number(&reception.reception_number, sequence),
            kind,
            method: input.method,
            amount: input.amount,
            reference_number: input
                .reference_number
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
            paid_at: input.paid_at.unwrap_or_else(Utc::now),
            audit: AuditInfo::default(),
        };

        let mut attempts = 1;
        let payment = loop {
            match self.repos.payments.insert(payment.clone(), actor).await {
                Ok(stored) => break stored,
                Err(err)
                    if err.is_conflict_on("receipt_number") && attempts < NUMBERING_ATTEMPTS =>
                {
                    attempts += 1;
                    debug!(
                        receipt_number = %payment.receipt_number,
                        "Receipt number taken, retrying"
                    );
                    sequence = (sequence + 1).max(self.receipt_count(reception.id).await? + 1);
                    payment.receipt_number = receipt_number(&reception.reception_number, sequence);
                }
                Err(err) => return Err(err.into()),
            }
        };

        info!(
            reception_id = %reception.id,
            receipt_number = %payment.receipt_number,
            kind = %payment.kind,
            method = %payment.method,
            amount = %payment.amount,
            "Payment recorded"
        );
        Ok(payment)
    }

    /// Receipts issued on a reception; deleted rows keep their numbers
    async fn receipt_count(&self, reception_id: Uuid) -> BillingResult<u64> {
        let existing = ListQuery::new()
            .with_filter("reception_id", reception_id.to_string())
            .including_deleted(true);
        Ok(self.repos.payments.count(&existing).await?)
    }
}

fn check_positive(amount: Decimal) -> BillingResult<()> {
    if amount <= Decimal::ZERO {
        return Err(BillingError::Validation("amount must be positive".to_string()));
    }
    if !amount.fract().is_zero() {
        return Err(BillingError::Validation(
            "amount must be a whole number of Rials".to_string(),
        ));
    }
    Ok(())
}
