use billing_service::Balance;
use chrono::NaiveDate;
use config_engine::CurrencyDisplay;
use database_layer::ReceptionStatus;
use insurance_service::{AppliedInsurance, ResolvedCoverage};
use reception_service::ReceptionDetails;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::insurance::CombinedInsuranceCalculationViewModel;
use crate::formatting::{
    format_amount, format_jalali_datetime, format_jalali_long, to_persian_digits,
};

pub fn status_label(status: ReceptionStatus) -> &'static str {
    match status {
        ReceptionStatus::Registered => "پذیرش شده",
        ReceptionStatus::InProgress => "در حال انجام",
        ReceptionStatus::Completed => "تکمیل شده",
        ReceptionStatus::Cancelled => "لغو شده",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FormSectionKey {
    Patient,
    Insurance,
    Services,
    Payment,
}

impl FormSectionKey {
    pub const ORDER: [FormSectionKey; 4] = [
        FormSectionKey::Patient,
        FormSectionKey::Insurance,
        FormSectionKey::Services,
        FormSectionKey::Payment,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            FormSectionKey::Patient => "اطلاعات بیمار",
            FormSectionKey::Insurance => "اطلاعات بیمه",
            FormSectionKey::Services => "خدمات",
            FormSectionKey::Payment => "پرداخت",
        }
    }
}

/// One panel of the reception accordion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FormSection {
    pub key: FormSectionKey,
    pub title: String,
    pub is_complete: bool,
    pub is_expanded: bool,
    /// One-line digest shown on the collapsed header
    pub summary: String,
}

/// Reception accordion form
///
/// Sections are patient, insurance, services and payment, in that order.
/// The first incomplete section is expanded; once everything is complete
/// the payment section stays open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReceptionFormViewModel {
    pub reception_id: Uuid,
    pub reception_number: String,
    pub formatted_reception_number: String,
    pub status: ReceptionStatus,
    pub status_label: String,
    pub received_at_display: String,
    pub reception_day_display: String,
    pub patient_id: Uuid,
    pub patient_name: String,
    pub patient_file_number: String,
    pub patient_national_code: String,
    pub doctor_id: Uuid,
    pub doctor_name: String,
    pub doctor_specialty: String,
    pub notes: Option<String>,
    pub sections: Vec<FormSection>,
    pub calculation: CombinedInsuranceCalculationViewModel,
    pub balance: Balance,
    pub formatted_patient_total: String,
    pub formatted_paid: String,
    pub formatted_outstanding: String,
    pub can_edit_services: bool,
    pub can_receive_payment: bool,
}

fn valid_on(applied: &AppliedInsurance, day: NaiveDate) -> bool {
    applied.insurance.audit.is_live()
        && applied.insurance.is_valid_on(day)
        && applied.plan.is_effective_on(day)
}

/// Recorded insurances still valid on the visit day; self-pay counts as complete
fn insurance_complete(coverage: &ResolvedCoverage, day: NaiveDate) -> bool {
    [coverage.primary.as_ref(), coverage.supplementary.as_ref()]
        .into_iter()
        .flatten()
        .all(|applied| valid_on(applied, day))
}

fn insurance_summary(coverage: &ResolvedCoverage) -> String {
    let names: Vec<&str> = [coverage.primary.as_ref(), coverage.supplementary.as_ref()]
        .into_iter()
        .flatten()
        .map(|applied| applied.provider.name.as_str())
        .collect();
    if names.is_empty() {
        "بدون بیمه".to_string()
    } else {
        names.join(" + ")
    }
}

impl ReceptionFormViewModel {
    pub fn build(details: &ReceptionDetails, display: CurrencyDisplay) -> Self {
        let reception = &details.reception;
        let day = reception.reception_day;
        let balance = details.balance;
        let has_lines = !details.lines.is_empty();

        let completeness = |key: FormSectionKey| -> (bool, String) {
            match key {
                FormSectionKey::Patient => (
                    details.patient.audit.is_live(),
                    format!(
                        "{} - پرونده {}",
                        details.patient.full_name(),
                        to_persian_digits(&details.patient.file_number)
                    ),
                ),
                FormSectionKey::Insurance => (
                    insurance_complete(&details.coverage, day),
                    insurance_summary(&details.coverage),
                ),
                FormSectionKey::Services => (
                    has_lines,
                    format!("{} خدمت", to_persian_digits(&details.lines.len().to_string())),
                ),
                FormSectionKey::Payment => {
                    let settled = has_lines && balance.is_settled();
                    let summary = if settled {
                        "تسویه شده".to_string()
                    } else {
                        format!("مانده: {}", format_amount(balance.outstanding, display))
                    };
                    (settled, summary)
                }
            }
        };

        let mut sections: Vec<FormSection> = FormSectionKey::ORDER
            .iter()
            .map(|key| {
                let (is_complete, summary) = completeness(*key);
                FormSection {
                    key: *key,
                    title: key.title().to_string(),
                    is_complete,
                    is_expanded: false,
                    summary,
                }
            })
            .collect();
        let expanded = sections
            .iter()
            .position(|section| !section.is_complete)
            .unwrap_or(sections.len().saturating_sub(1));
        if let Some(section) = sections.get_mut(expanded) {
            section.is_expanded = true;
        }

        Self {
            reception_id: reception.id,
            reception_number: reception.reception_number.clone(),
            formatted_reception_number: to_persian_digits(&reception.reception_number),
            status: reception.status,
            status_label: status_label(reception.status).to_string(),
            received_at_display: format_jalali_datetime(reception.received_at),
            reception_day_display: format_jalali_long(day),
            patient_id: details.patient.id,
            patient_name: details.patient.full_name(),
            patient_file_number: details.patient.file_number.clone(),
            patient_national_code: details.patient.national_code.clone(),
            doctor_id: details.doctor.id,
            doctor_name: details.doctor.full_name(),
            doctor_specialty: details.doctor.specialty.clone(),
            notes: reception.notes.clone(),
            sections,
            calculation: CombinedInsuranceCalculationViewModel::from_details(details, display),
            balance,
            formatted_patient_total: format_amount(balance.patient_total, display),
            formatted_paid: format_amount(balance.net_paid, display),
            formatted_outstanding: format_amount(balance.outstanding, display),
            can_edit_services: reception.status.is_open(),
            can_receive_payment: reception.status != ReceptionStatus::Cancelled
                && balance.outstanding > Decimal::ZERO,
        }
    }

    pub fn section(&self, key: FormSectionKey) -> Option<&FormSection> {
        self.sections.iter().find(|section| section.key == key)
    }

    pub fn expanded_section(&self) -> Option<FormSectionKey> {
        self.sections
            .iter()
            .find(|section| section.is_expanded)
            .map(|section| section.key)
    }
}
