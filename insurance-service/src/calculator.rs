// Splitting a priced line between primary insurer, supplementary insurer and patient
use rust_decimal::Decimal;

use crate::error::{InsuranceError, InsuranceResult};
use crate::models::{CoverageSlot, LineCoverage, SlotShare};

/// Pure coverage arithmetic; all amounts are whole Rials
///
/// Insurer shares are truncated toward zero, so any fraction of a Rial
/// stays with the patient and the three shares always add up to the base
/// amount.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoverageCalculator;

impl CoverageCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Price `quantity` units and split them between the given plans
    ///
    /// `list_price` is the service's base price, used when the primary plan
    /// has no tariff for the day.
    pub fn calculate(
        &self,
        quantity: i32,
        list_price: Decimal,
        primary: Option<&CoverageSlot>,
        supplementary: Option<&CoverageSlot>,
    ) -> InsuranceResult<LineCoverage> {
        if quantity < 1 {
            return Err(InsuranceError::Validation(
                "quantity must be at least 1".to_string(),
            ));
        }

        let unit_price = primary
            .and_then(|slot| slot.tariff.as_ref())
            .map(|tariff| tariff.total_price)
            .unwrap_or(list_price);
        if unit_price.is_sign_negative() {
            return Err(InsuranceError::Validation(
                "unit price cannot be negative".to_string(),
            ));
        }

        let units = Decimal::from(quantity);
        let base_amount = unit_price * units;

        let primary_share = primary.map(|slot| Self::apply(slot, base_amount, units, true));
        let primary_amount = primary_share.as_ref().map_or(Decimal::ZERO, |s| s.share);

        let remaining = base_amount - primary_amount;
        let supplementary_share =
            supplementary.map(|slot| Self::apply(slot, remaining, units, false));
        let supplementary_amount = supplementary_share.as_ref().map_or(Decimal::ZERO, |s| s.share);

        let deductible_amount = primary_share.as_ref().map_or(Decimal::ZERO, |s| s.deductible)
            + supplementary_share.as_ref().map_or(Decimal::ZERO, |s| s.deductible);

        Ok(LineCoverage {
            quantity,
            unit_price,
            base_amount,
            primary: primary_share,
            supplementary: supplementary_share,
            primary_share: primary_amount,
            supplementary_share: supplementary_amount,
            patient_share: base_amount - primary_amount - supplementary_amount,
            deductible_amount,
        })
    }

    /// Share of `amount` one plan pays
    fn apply(
        slot: &CoverageSlot,
        amount: Decimal,
        units: Decimal,
        fixed_share_allowed: bool,
    ) -> SlotShare {
        let plan_id = slot.plan.id;
        let rule = match slot
            .plan_service
            .as_ref()
            .filter(|rule| rule.audit.is_live() && rule.is_covered)
        {
            Some(rule) => rule,
            None => {
                return SlotShare {
                    plan_id,
                    is_covered: false,
                    coverage_percent: Decimal::ZERO,
                    deductible: Decimal::ZERO,
                    share: Decimal::ZERO,
                }
            }
        };

        let fixed_share = if fixed_share_allowed {
            slot.tariff.as_ref().and_then(|tariff| tariff.insurer_share)
        } else {
            None
        };

        let deductible = percent_of(amount, slot.plan.deductible_percent);
        let mut share = match fixed_share {
            // A negotiated insurer share replaces the percentage, never the deductible
            Some(per_unit) => (per_unit * units).min(amount - deductible),
            None => {
                let percent = rule
                    .coverage_percent
                    .unwrap_or(slot.plan.default_coverage_percent);
                percent_of(amount - deductible, percent)
            }
        };

        if let Some(cap) = rule.max_coverage_amount {
            share = share.min(cap * units);
        }
        if let Some(copay) = rule.copay_amount {
            share = share.min(amount - copay * units);
        }
        let share = share.max(Decimal::ZERO).min(amount.max(Decimal::ZERO));

        let coverage_percent = if amount > Decimal::ZERO {
            (share * Decimal::ONE_HUNDRED / amount).round_dp(2).normalize()
        } else {
            Decimal::ZERO
        };

        SlotShare {
            plan_id,
            is_covered: true,
            coverage_percent,
            deductible,
            share,
        }
    }
}

/// `amount * percent / 100`, truncated to whole Rials
fn percent_of(amount: Decimal, percent: Decimal) -> Decimal {
    (amount * percent / Decimal::ONE_HUNDRED).trunc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use database_layer::{AuditInfo, InsurancePlan, InsuranceTariff, PlanService, PlanTier};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn plan(coverage: Decimal, deductible: Decimal) -> InsurancePlan {
        InsurancePlan {
            id: Uuid::new_v4(),
            provider_id: Uuid::new_v4(),
            name: "Plan".to_string(),
            tier: PlanTier::Standard,
            default_coverage_percent: coverage,
            deductible_percent: deductible,
            effective_from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            effective_to: None,
            is_active: true,
            audit: AuditInfo::default(),
        }
    }

    fn rule(plan: &InsurancePlan) -> PlanService {
        PlanService {
            id: Uuid::new_v4(),
            plan_id: plan.id,
            category_id: Uuid::new_v4(),
            is_covered: true,
            coverage_percent: None,
            copay_amount: None,
            max_coverage_amount: None,
            audit: AuditInfo::default(),
        }
    }

    fn tariff(plan: &InsurancePlan, total: Decimal, insurer_share: Option<Decimal>) -> InsuranceTariff {
        InsuranceTariff {
            id: Uuid::new_v4(),
            plan_id: plan.id,
            service_id: Uuid::new_v4(),
            total_price: total,
            insurer_share,
            effective_from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            effective_to: None,
            audit: AuditInfo::default(),
        }
    }

    fn slot(plan: InsurancePlan) -> CoverageSlot {
        let plan_service = Some(rule(&plan));
        CoverageSlot {
            plan,
            plan_service,
            tariff: None,
        }
    }

    fn assert_balanced(line: &LineCoverage) {
        assert_eq!(
            line.primary_share + line.supplementary_share + line.patient_share,
            line.base_amount
        );
        assert!(line.primary_share >= Decimal::ZERO);
        assert!(line.supplementary_share >= Decimal::ZERO);
        assert!(line.patient_share >= Decimal::ZERO);
    }

    #[test]
    fn test_no_insurance_patient_pays_list_price() {
        let line = CoverageCalculator::new()
            .calculate(2, dec!(450000), None, None)
            .unwrap();
        assert_eq!(line.base_amount, dec!(900000));
        assert_eq!(line.patient_share, dec!(900000));
        assert_eq!(line.insurer_total(), Decimal::ZERO);
    }

    #[test]
    fn test_primary_percentage_with_deductible() {
        let primary = slot(plan(dec!(70), dec!(10)));
        let line = CoverageCalculator::new()
            .calculate(1, dec!(1000000), Some(&primary), None)
            .unwrap();
        // deductible 100000, 70% of 900000
        assert_eq!(line.deductible_amount, dec!(100000));
        assert_eq!(line.primary_share, dec!(630000));
        assert_eq!(line.patient_share, dec!(370000));
        assert_balanced(&line);
    }

    #[test]
    fn test_supplementary_applies_to_remainder() {
        let primary = slot(plan(dec!(70), Decimal::ZERO));
        let supplementary = slot(plan(dec!(50), Decimal::ZERO));
        let line = CoverageCalculator::new()
            .calculate(1, dec!(1000000), Some(&primary), Some(&supplementary))
            .unwrap();
        assert_eq!(line.primary_share, dec!(700000));
        assert_eq!(line.supplementary_share, dec!(150000));
        assert_eq!(line.patient_share, dec!(150000));
        assert_balanced(&line);
    }

    #[test]
    fn test_tariff_price_and_fixed_insurer_share() {
        let mut primary = slot(plan(dec!(90), dec!(10)));
        primary.tariff = Some(tariff(&primary.plan, dec!(800000), Some(dec!(600000))));
        let line = CoverageCalculator::new()
            .calculate(3, dec!(1000000), Some(&primary), None)
            .unwrap();
        assert_eq!(line.unit_price, dec!(800000));
        assert_eq!(line.base_amount, dec!(2400000));
        assert_eq!(line.primary_share, dec!(1800000));
        // 10% of 2,400,000 is still charged, it just does not bind here
        assert_eq!(line.deductible_amount, dec!(240000));
        assert_eq!(line.patient_share, dec!(600000));
        assert_eq!(line.primary.as_ref().unwrap().coverage_percent, dec!(75));
    }

    #[test]
    fn test_fixed_insurer_share_leaves_deductible_to_patient() {
        let mut primary = slot(plan(dec!(90), dec!(10)));
        primary.tariff = Some(tariff(&primary.plan, dec!(800000), Some(dec!(780000))));
        let line = CoverageCalculator::new()
            .calculate(1, dec!(1000000), Some(&primary), None)
            .unwrap();
        assert_eq!(line.deductible_amount, dec!(80000));
        assert_eq!(line.primary_share, dec!(720000));
        assert_eq!(line.patient_share, dec!(80000));
        assert_balanced(&line);
    }

    #[test]
    fn test_uncovered_category_pays_nothing() {
        let mut primary = slot(plan(dec!(70), Decimal::ZERO));
        primary.plan_service = None;
        let line = CoverageCalculator::new()
            .calculate(1, dec!(500000), Some(&primary), None)
            .unwrap();
        assert_eq!(line.primary_share, Decimal::ZERO);
        assert!(!line.primary.as_ref().unwrap().is_covered);
        assert_eq!(line.patient_share, dec!(500000));

        let mut excluded = slot(plan(dec!(70), Decimal::ZERO));
        if let Some(rule) = excluded.plan_service.as_mut() {
            rule.is_covered = false;
        }
        let line = CoverageCalculator::new()
            .calculate(1, dec!(500000), Some(&excluded), None)
            .unwrap();
        assert_eq!(line.primary_share, Decimal::ZERO);
    }

    #[test]
    fn test_override_cap_and_copay() {
        let mut primary = slot(plan(dec!(70), Decimal::ZERO));
        if let Some(rule) = primary.plan_service.as_mut() {
            rule.coverage_percent = Some(dec!(100));
            rule.max_coverage_amount = Some(dec!(300000));
        }
        let line = CoverageCalculator::new()
            .calculate(2, dec!(400000), Some(&primary), None)
            .unwrap();
        // 100% of 800000 capped at 2 x 300000
        assert_eq!(line.primary_share, dec!(600000));

        let mut copay = slot(plan(dec!(100), Decimal::ZERO));
        if let Some(rule) = copay.plan_service.as_mut() {
            rule.copay_amount = Some(dec!(50000));
        }
        let line = CoverageCalculator::new()
            .calculate(2, dec!(400000), Some(&copay), None)
            .unwrap();
        assert_eq!(line.primary_share, dec!(700000));
        assert_eq!(line.patient_share, dec!(100000));
    }

    #[test]
    fn test_copay_above_amount_never_goes_negative() {
        let mut primary = slot(plan(dec!(100), Decimal::ZERO));
        if let Some(rule) = primary.plan_service.as_mut() {
            rule.copay_amount = Some(dec!(900000));
        }
        let line = CoverageCalculator::new()
            .calculate(1, dec!(500000), Some(&primary), None)
            .unwrap();
        assert_eq!(line.primary_share, Decimal::ZERO);
        assert_eq!(line.patient_share, dec!(500000));
    }

    #[test]
    fn test_fractions_stay_with_patient() {
        let primary = slot(plan(dec!(33.33), Decimal::ZERO));
        let supplementary = slot(plan(dec!(33.33), Decimal::ZERO));
        let line = CoverageCalculator::new()
            .calculate(1, dec!(100001), Some(&primary), Some(&supplementary))
            .unwrap();
        assert_eq!(line.primary_share, dec!(33330));
        assert_eq!(line.supplementary_share, dec!(22221));
        assert_eq!(line.patient_share, dec!(44450));
        assert_balanced(&line);
    }

    #[test]
    fn test_supplementary_tariff_share_is_ignored() {
        let primary = slot(plan(dec!(50), Decimal::ZERO));
        let mut supplementary = slot(plan(dec!(40), Decimal::ZERO));
        supplementary.tariff = Some(tariff(&supplementary.plan, dec!(1), Some(dec!(999999))));
        let line = CoverageCalculator::new()
            .calculate(1, dec!(200000), Some(&primary), Some(&supplementary))
            .unwrap();
        assert_eq!(line.unit_price, dec!(200000));
        assert_eq!(line.supplementary_share, dec!(40000));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let err = CoverageCalculator::new()
            .calculate(0, dec!(1000), None, None)
            .unwrap_err();
        assert!(matches!(err, InsuranceError::Validation(_)));
    }
}
