// Which of a patient's insurances apply to a visit
use chrono::NaiveDate;
use database_layer::{CoverageKind, DatabaseError, FieldValue, PatientInsurance};
use tracing::debug;
use uuid::Uuid;

use crate::error::{InsuranceError, InsuranceResult};
use crate::models::{AppliedInsurance, ResolvedCoverage};
use crate::service::InsuranceService;

impl InsuranceService {
    /// Pick the primary and supplementary insurance for a visit day
    ///
    /// Pinned ids are checked and used as given. Otherwise the valid
    /// insurance of each kind with the lowest priority wins, then the
    /// earliest `valid_from`, then the smallest id.
    pub async fn resolve_coverage(
        &self,
        patient_id: Uuid,
        on_date: NaiveDate,
        pinned_primary: Option<Uuid>,
        pinned_supplementary: Option<Uuid>,
    ) -> InsuranceResult<ResolvedCoverage> {
        let insurances = self
            .repos()
            .patient_insurances
            .find_by("patient_id", FieldValue::from(patient_id))
            .await?;

        let primary = self
            .resolve_slot(&insurances, CoverageKind::Primary, pinned_primary, on_date)
            .await?;
        let supplementary = self
            .resolve_slot(
                &insurances,
                CoverageKind::Supplementary,
                pinned_supplementary,
                on_date,
            )
            .await?;

        debug!(
            %patient_id,
            %on_date,
            primary = ?primary.as_ref().map(|a| a.insurance.id),
            supplementary = ?supplementary.as_ref().map(|a| a.insurance.id),
            "Coverage resolved"
        );
        Ok(ResolvedCoverage {
            primary,
            supplementary,
        })
    }

    async fn resolve_slot(
        &self,
        insurances: &[PatientInsurance],
        kind: CoverageKind,
        pinned: Option<Uuid>,
        on_date: NaiveDate,
    ) -> InsuranceResult<Option<AppliedInsurance>> {
        if let Some(id) = pinned {
            let insurance = insurances.iter().find(|i| i.id == id).ok_or_else(|| {
                InsuranceError::InvalidCoverage(format!("insurance {id} does not belong to the patient"))
            })?;
            if insurance.kind != kind {
                return Err(InsuranceError::InvalidCoverage(format!(
                    "insurance {id} is {}, not {kind}",
                    insurance.kind
                )));
            }
            return match self.applicable(insurance, on_date).await? {
                Some(applied) => Ok(Some(applied)),
                None => Err(InsuranceError::InvalidCoverage(format!(
                    "insurance {id} is not valid on {on_date}"
                ))),
            };
        }

        let mut candidates: Vec<&PatientInsurance> =
            insurances.iter().filter(|i| i.kind == kind).collect();
        candidates.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.valid_from.cmp(&b.valid_from))
                .then_with(|| a.id.cmp(&b.id))
        });

        for insurance in candidates {
            if let Some(applied) = self.applicable(insurance, on_date).await? {
                return Ok(Some(applied));
            }
        }
        Ok(None)
    }

    /// Coverage recorded on a reception, loaded back by id
    ///
    /// Rows deleted since the reception was created are still returned so
    /// old receptions keep their insurers.
    pub async fn coverage_of(
        &self,
        primary: Option<Uuid>,
        supplementary: Option<Uuid>,
    ) -> InsuranceResult<ResolvedCoverage> {
        Ok(ResolvedCoverage {
            primary: self.recorded(primary).await?,
            supplementary: self.recorded(supplementary).await?,
        })
    }

    async fn recorded(&self, insurance_id: Option<Uuid>) -> InsuranceResult<Option<AppliedInsurance>> {
        let Some(id) = insurance_id else {
            return Ok(None);
        };
        let repos = self.repos();
        let insurance = repos
            .patient_insurances
            .find_including_deleted(id)
            .await?
            .ok_or_else(|| DatabaseError::not_found("patient insurance", id))?;
        let plan = repos
            .insurance_plans
            .find_including_deleted(insurance.plan_id)
            .await?
            .ok_or_else(|| DatabaseError::not_found("insurance plan", insurance.plan_id))?;
        let provider = repos
            .insurance_providers
            .find_including_deleted(plan.provider_id)
            .await?
            .ok_or_else(|| DatabaseError::not_found("insurance provider", plan.provider_id))?;

        Ok(Some(AppliedInsurance {
            insurance,
            plan,
            provider,
        }))
    }

    /// The insurance with its plan and insurer, when all are usable on the day
    async fn applicable(
        &self,
        insurance: &PatientInsurance,
        on_date: NaiveDate,
    ) -> InsuranceResult<Option<AppliedInsurance>> {
        if !insurance.is_valid_on(on_date) {
            return Ok(None);
        }
        let plan = match self.repos().insurance_plans.find_by_id(insurance.plan_id).await? {
            Some(plan) if plan.is_effective_on(on_date) => plan,
            _ => return Ok(None),
        };
        let provider = match self.repos().insurance_providers.find_by_id(plan.provider_id).await? {
            Some(provider) => provider,
            None => return Ok(None),
        };

        Ok(Some(AppliedInsurance {
            insurance: insurance.clone(),
            plan,
            provider,
        }))
    }
}
