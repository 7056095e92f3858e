//! Insurance calculation displays: one insurer's share and the combined
//! split of a reception (or a preview) between insurers and patient

use config_engine::CurrencyDisplay;
use database_layer::{CoverageKind, InsuranceCalculation, MedicalService};
use insurance_service::{AppliedInsurance, CoveragePreview, LineCoverage, ResolvedCoverage};
use reception_service::ReceptionDetails;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::formatting::{format_amount, format_percent, to_persian_digits};

pub fn kind_label(kind: CoverageKind) -> &'static str {
    match kind {
        CoverageKind::Primary => "بیمه پایه",
        CoverageKind::Supplementary => "بیمه تکمیلی",
    }
}

/// Share of `base` as a percentage, two decimal places
fn share_percent(share: Decimal, base: Decimal) -> Decimal {
    if base.is_zero() {
        return Decimal::ZERO;
    }
    (share * Decimal::ONE_HUNDRED / base).round_dp(2).normalize()
}

/// One insurer's part of a calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InsuranceShareViewModel {
    pub insurance_id: Option<Uuid>,
    pub insurer_name: Option<String>,
    pub plan_name: Option<String>,
    pub kind: CoverageKind,
    pub kind_label: String,
    /// Effective share of the base amount
    pub coverage_percent: Decimal,
    pub share_amount: Decimal,
    pub formatted_share: String,
    pub formatted_percent: String,
    pub is_applied: bool,
}

impl InsuranceShareViewModel {
    pub fn applied(
        applied: &AppliedInsurance,
        kind: CoverageKind,
        share: Decimal,
        base: Decimal,
        display: CurrencyDisplay,
    ) -> Self {
        let coverage_percent = share_percent(share, base);
        Self {
            insurance_id: Some(applied.insurance.id),
            insurer_name: Some(applied.provider.name.clone()),
            plan_name: Some(applied.plan.name.clone()),
            kind,
            kind_label: kind_label(kind).to_string(),
            coverage_percent,
            share_amount: share,
            formatted_share: format_amount(share, display),
            formatted_percent: format_percent(coverage_percent),
            is_applied: true,
        }
    }

    /// Placeholder for a slot with no insurance on the visit day
    pub fn not_applied(kind: CoverageKind, display: CurrencyDisplay) -> Self {
        Self {
            insurance_id: None,
            insurer_name: None,
            plan_name: None,
            kind,
            kind_label: kind_label(kind).to_string(),
            coverage_percent: Decimal::ZERO,
            share_amount: Decimal::ZERO,
            formatted_share: format_amount(Decimal::ZERO, display),
            formatted_percent: format_percent(Decimal::ZERO),
            is_applied: false,
        }
    }

    fn for_slot(
        applied: Option<&AppliedInsurance>,
        kind: CoverageKind,
        share: Decimal,
        base: Decimal,
        display: CurrencyDisplay,
    ) -> Self {
        match applied {
            Some(applied) => Self::applied(applied, kind, share, base, display),
            None => Self::not_applied(kind, display),
        }
    }
}

/// One service line of a calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CalculationRowViewModel {
    /// Absent on previews
    pub line_id: Option<Uuid>,
    pub service_code: String,
    pub service_name: String,
    pub quantity: i32,
    pub formatted_quantity: String,
    pub base_amount: Decimal,
    pub primary_share: Decimal,
    pub supplementary_share: Decimal,
    pub patient_share: Decimal,
    pub deductible_amount: Decimal,
    pub formatted_base: String,
    pub formatted_primary: String,
    pub formatted_supplementary: String,
    pub formatted_patient: String,
}

struct RowAmounts {
    quantity: i32,
    base: Decimal,
    primary: Decimal,
    supplementary: Decimal,
    patient: Decimal,
    deductible: Decimal,
}

impl From<&InsuranceCalculation> for RowAmounts {
    fn from(calc: &InsuranceCalculation) -> Self {
        Self {
            quantity: 0,
            base: calc.base_amount,
            primary: calc.primary_share,
            supplementary: calc.supplementary_share,
            patient: calc.patient_share,
            deductible: calc.deductible_amount,
        }
    }
}

impl From<&LineCoverage> for RowAmounts {
    fn from(line: &LineCoverage) -> Self {
        Self {
            quantity: line.quantity,
            base: line.base_amount,
            primary: line.primary_share,
            supplementary: line.supplementary_share,
            patient: line.patient_share,
            deductible: line.deductible_amount,
        }
    }
}

impl CalculationRowViewModel {
    fn build(
        line_id: Option<Uuid>,
        service: &MedicalService,
        amounts: RowAmounts,
        display: CurrencyDisplay,
    ) -> Self {
        Self {
            line_id,
            service_code: service.code.clone(),
            service_name: service.name.clone(),
            quantity: amounts.quantity,
            formatted_quantity: to_persian_digits(&amounts.quantity.to_string()),
            base_amount: amounts.base,
            primary_share: amounts.primary,
            supplementary_share: amounts.supplementary,
            patient_share: amounts.patient,
            deductible_amount: amounts.deductible,
            formatted_base: format_amount(amounts.base, display),
            formatted_primary: format_amount(amounts.primary, display),
            formatted_supplementary: format_amount(amounts.supplementary, display),
            formatted_patient: format_amount(amounts.patient, display),
        }
    }
}

/// Per-line rows plus totals for the insurance calculation panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CombinedInsuranceCalculationViewModel {
    pub rows: Vec<CalculationRowViewModel>,
    pub primary: InsuranceShareViewModel,
    pub supplementary: InsuranceShareViewModel,
    pub has_insurance: bool,
    pub total_base: Decimal,
    pub total_primary: Decimal,
    pub total_supplementary: Decimal,
    pub total_insurer: Decimal,
    pub total_patient: Decimal,
    pub total_deductible: Decimal,
    pub formatted_total_base: String,
    pub formatted_total_insurer: String,
    pub formatted_total_patient: String,
    pub formatted_total_deductible: String,
    /// `سهم بیمه: ... - سهم بیمار: ...`
    pub summary_text: String,
}

impl CombinedInsuranceCalculationViewModel {
    /// Calculation panel of a stored reception; lines without a live
    /// calculation are skipped
    pub fn from_details(details: &ReceptionDetails, display: CurrencyDisplay) -> Self {
        let rows = details
            .lines
            .iter()
            .filter_map(|line| {
                line.calculation.as_ref().map(|calc| {
                    let amounts = RowAmounts {
                        quantity: line.line.quantity,
                        ..RowAmounts::from(calc)
                    };
                    CalculationRowViewModel::build(Some(line.line.id), &line.service, amounts, display)
                })
            })
            .collect();
        Self::from_rows(rows, &details.coverage, display)
    }

    /// Calculation panel of a single unsaved line
    pub fn from_preview(preview: &CoveragePreview, display: CurrencyDisplay) -> Self {
        let row = CalculationRowViewModel::build(
            None,
            &preview.service,
            RowAmounts::from(&preview.line),
            display,
        );
        Self::from_rows(vec![row], &preview.coverage, display)
    }

    fn from_rows(
        rows: Vec<CalculationRowViewModel>,
        coverage: &ResolvedCoverage,
        display: CurrencyDisplay,
    ) -> Self {
        let sum = |pick: fn(&CalculationRowViewModel) -> Decimal| -> Decimal {
            rows.iter().map(pick).sum()
        };
        let total_base = sum(|r| r.base_amount);
        let total_primary = sum(|r| r.primary_share);
        let total_supplementary = sum(|r| r.supplementary_share);
        let total_patient = sum(|r| r.patient_share);
        let total_deductible = sum(|r| r.deductible_amount);
        let total_insurer = total_primary + total_supplementary;

        let primary = InsuranceShareViewModel::for_slot(
            coverage.primary.as_ref(),
            CoverageKind::Primary,
            total_primary,
            total_base,
            display,
        );
        let supplementary = InsuranceShareViewModel::for_slot(
            coverage.supplementary.as_ref(),
            CoverageKind::Supplementary,
            total_supplementary,
            total_base,
            display,
        );

        let formatted_total_insurer = format_amount(total_insurer, display);
        let formatted_total_patient = format_amount(total_patient, display);
        let summary_text = format!(
            "سهم بیمه: {formatted_total_insurer} - سهم بیمار: {formatted_total_patient}"
        );

        Self {
            rows,
            has_insurance: !coverage.is_empty(),
            primary,
            supplementary,
            total_base,
            total_primary,
            total_supplementary,
            total_insurer,
            total_patient,
            total_deductible,
            formatted_total_base: format_amount(total_base, display),
            formatted_total_insurer,
            formatted_total_patient,
            formatted_total_deductible: format_amount(total_deductible, display),
            summary_text,
        }
    }

    /// Insurers actually applied, primary first
    pub fn applied_shares(&self) -> Vec<InsuranceShareViewModel> {
        [&self.primary, &self.supplementary]
            .into_iter()
            .filter(|share| share.is_applied)
            .cloned()
            .collect()
    }
}
