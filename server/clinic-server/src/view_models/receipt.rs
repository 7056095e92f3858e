use config_engine::ClinicSettings;
use database_layer::{Payment, PaymentKind, PaymentMethod};
use reception_service::{clinic_local, ReceptionDetails};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::insurance::{CombinedInsuranceCalculationViewModel, InsuranceShareViewModel};
use crate::formatting::{
    format_amount, format_clinic_time, format_jalali_date, format_number, to_persian_digits,
};

pub fn method_label(method: PaymentMethod) -> &'static str {
    match method {
        PaymentMethod::Cash => "نقدی",
        PaymentMethod::Card => "کارت",
        PaymentMethod::Pos => "کارتخوان",
        PaymentMethod::Transfer => "انتقال بانکی",
    }
}

pub fn receipt_title(kind: PaymentKind) -> &'static str {
    match kind {
        PaymentKind::Payment => "رسید پرداخت",
        PaymentKind::Refund => "رسید استرداد",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReceiptItemViewModel {
    pub service_name: String,
    pub quantity: i32,
    pub formatted_quantity: String,
    pub formatted_total: String,
    pub formatted_patient_share: String,
}

/// Printable payment or refund receipt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PaymentReceiptViewModel {
    pub payment_id: Uuid,
    pub reception_id: Uuid,
    pub title: String,
    pub is_refund: bool,
    pub receipt_number: String,
    pub formatted_receipt_number: String,
    pub clinic_name: String,
    pub date_display: String,
    pub time_display: String,
    pub patient_name: String,
    pub patient_file_number: String,
    pub doctor_name: String,
    pub reception_number: String,
    pub items: Vec<ReceiptItemViewModel>,
    pub insurers: Vec<InsuranceShareViewModel>,
    pub method: PaymentMethod,
    pub method_label: String,
    pub reference_number: Option<String>,
    /// Patient's share of the whole reception
    pub payable: Decimal,
    pub amount: Decimal,
    /// Net paid up to and including this receipt
    pub total_paid: Decimal,
    pub remaining: Decimal,
    /// Amount in grouped Persian figures, without a currency
    pub amount_figures: String,
    pub formatted_payable: String,
    pub formatted_amount: String,
    pub formatted_total_paid: String,
    pub formatted_remaining: String,
}

/// Net of the live payments up to and including `payment`, in receipt order
fn paid_through(payments: &[Payment], payment: &Payment) -> Decimal {
    let mut total = Decimal::ZERO;
    for entry in payments.iter().filter(|p| p.audit.is_live()) {
        total += entry.signed_amount();
        if entry.id == payment.id {
            return total;
        }
    }
    total
}

impl PaymentReceiptViewModel {
    pub fn build(payment: &Payment, details: &ReceptionDetails, clinic: &ClinicSettings) -> Self {
        let display = clinic.currency_display;
        let calculation = CombinedInsuranceCalculationViewModel::from_details(details, display);

        let items = details
            .lines
            .iter()
            .map(|line| {
                let patient_share = line
                    .calculation
                    .as_ref()
                    .map(|calc| calc.patient_share)
                    .unwrap_or(line.line.total_price);
                ReceiptItemViewModel {
                    service_name: line.service.name.clone(),
                    quantity: line.line.quantity,
                    formatted_quantity: to_persian_digits(&line.line.quantity.to_string()),
                    formatted_total: format_amount(line.line.total_price, display),
                    formatted_patient_share: format_amount(patient_share, display),
                }
            })
            .collect();

        let payable = details.balance.patient_total;
        let total_paid = paid_through(&details.payments, payment);
        let remaining = payable - total_paid;

        Self {
            payment_id: payment.id,
            reception_id: details.reception.id,
            title: receipt_title(payment.kind).to_string(),
            is_refund: payment.kind == PaymentKind::Refund,
            receipt_number: payment.receipt_number.clone(),
            formatted_receipt_number: to_persian_digits(&payment.receipt_number),
            clinic_name: clinic.name.clone(),
            date_display: format_jalali_date(clinic_local(payment.paid_at).date()),
            time_display: format_clinic_time(payment.paid_at),
            patient_name: details.patient.full_name(),
            patient_file_number: details.patient.file_number.clone(),
            doctor_name: details.doctor.full_name(),
            reception_number: details.reception.reception_number.clone(),
            items,
            insurers: calculation.applied_shares(),
            method: payment.method,
            method_label: method_label(payment.method).to_string(),
            reference_number: payment.reference_number.clone(),
            payable,
            amount: payment.amount,
            total_paid,
            remaining,
            amount_figures: format_number(payment.amount),
            formatted_payable: format_amount(payable, display),
            formatted_amount: format_amount(payment.amount, display),
            formatted_total_paid: format_amount(total_paid, display),
            formatted_remaining: format_amount(remaining, display),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view_models::fixtures::clinic;
    use config_engine::CurrencyDisplay;
    use rust_decimal_macros::dec;

    fn settings() -> ClinicSettings {
        ClinicSettings {
            name: "درمانگاه شفا".to_string(),
            currency_display: CurrencyDisplay::Rial,
        }
    }

    #[tokio::test]
    async fn test_payment_receipt() {
        let c = clinic().await;
        let reception_id = c.reception_with_visit().await;
        let first = c.pay(reception_id, dec!(100000)).await;
        let second = c.pay(reception_id, dec!(150000)).await;
        let details = c.service.reception_details(reception_id).await.unwrap();

        let receipt = PaymentReceiptViewModel::build(&first, &details, &settings());
        assert_eq!(receipt.title, "رسید پرداخت");
        assert!(!receipt.is_refund);
        assert_eq!(receipt.receipt_number, "140301150001-01");
        assert_eq!(receipt.formatted_receipt_number, "۱۴۰۳۰۱۱۵۰۰۰۱-۰۱");
        assert_eq!(receipt.clinic_name, "درمانگاه شفا");
        assert_eq!(receipt.date_display, "۱۴۰۳/۰۱/۱۵");
        assert_eq!(receipt.time_display, "۰۹:۳۰");
        assert_eq!(receipt.patient_file_number, "000001");
        assert_eq!(receipt.method_label, "کارتخوان");
        assert_eq!(receipt.items.len(), 1);
        assert_eq!(receipt.items[0].formatted_patient_share, "۳۰۰٬۰۰۰ ریال");
        assert_eq!(receipt.insurers.len(), 1);
        assert_eq!(receipt.amount_figures, "۱۰۰٬۰۰۰");
        assert_eq!(receipt.total_paid, dec!(100000));
        assert_eq!(receipt.formatted_remaining, "۲۰۰٬۰۰۰ ریال");

        let receipt = PaymentReceiptViewModel::build(&second, &details, &settings());
        assert_eq!(receipt.receipt_number, "140301150001-02");
        assert_eq!(receipt.total_paid, dec!(250000));
        assert_eq!(receipt.remaining, dec!(50000));
        assert_eq!(receipt.formatted_payable, "۳۰۰٬۰۰۰ ریال");
    }

    #[tokio::test]
    async fn test_refund_receipt() {
        let c = clinic().await;
        let reception_id = c.reception_with_visit().await;
        c.pay(reception_id, dec!(300000)).await;
        let refund = c.refund(reception_id, dec!(50000)).await;
        let details = c.service.reception_details(reception_id).await.unwrap();

        let receipt = PaymentReceiptViewModel::build(&refund, &details, &settings());
        assert_eq!(receipt.title, "رسید استرداد");
        assert!(receipt.is_refund);
        assert_eq!(receipt.method_label, "نقدی");
        assert_eq!(receipt.total_paid, dec!(250000));
        assert_eq!(receipt.formatted_remaining, "۵۰٬۰۰۰ ریال");
    }
}
