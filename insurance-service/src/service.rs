use chrono::NaiveDate;
use database_layer::{
    AuditInfo, Entity, FieldValue, InsurancePlan, InsuranceProvider, InsuranceTariff,
    MedicalService, PatientInsurance, PlanService, Repositories,
};
use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

use crate::calculator::CoverageCalculator;
use crate::error::{InsuranceError, InsuranceResult};
use crate::models::*;

/// Insurance plans, tariffs and coverage for clinic receptions
#[derive(Clone)]
pub struct InsuranceService {
    repos: Repositories,
    calculator: CoverageCalculator,
}

fn check_percent(field: &str, value: Decimal) -> InsuranceResult<()> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(InsuranceError::Validation(format!(
            "{field} must be between 0 and 100"
        )));
    }
    Ok(())
}

fn check_amount(field: &str, value: Decimal) -> InsuranceResult<()> {
    if value.is_sign_negative() {
        return Err(InsuranceError::Validation(format!("{field} cannot be negative")));
    }
    Ok(())
}

fn check_range(from: NaiveDate, to: Option<NaiveDate>) -> InsuranceResult<()> {
    match to {
        Some(to) if to < from => Err(InsuranceError::Validation(
            "end date cannot be before start date".to_string(),
        )),
        _ => Ok(()),
    }
}

fn required(field: &str, value: &str) -> InsuranceResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(InsuranceError::Validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

impl InsuranceService {
    pub fn new(repos: Repositories) -> Self {
        Self {
            repos,
            calculator: CoverageCalculator::new(),
        }
    }

    // ---- Providers ----

    pub async fn create_provider(
        &self,
        input: ProviderInput,
        actor: Option<Uuid>,
    ) -> InsuranceResult<InsuranceProvider> {
        let provider = self.build_provider(Uuid::new_v4(), input, None).await?;
        let provider = self.repos.insurance_providers.insert(provider, actor).await?;
        info!(provider_id = %provider.id, code = %provider.code, "Insurance provider created");
        Ok(provider)
    }

    pub async fn update_provider(
        &self,
        id: Uuid,
        input: ProviderInput,
        actor: Option<Uuid>,
    ) -> InsuranceResult<InsuranceProvider> {
        let existing = self.repos.insurance_providers.get(id).await?;
        let provider = self.build_provider(id, input, Some(existing.audit)).await?;
        Ok(self.repos.insurance_providers.update(provider, actor).await?)
    }

    async fn build_provider(&self, id: Uuid, input: ProviderInput, audit: Option<AuditInfo>) -> InsuranceResult<InsuranceProvider> {
        let code = required("code", &input.code)?;
        let duplicate = self
            .repos
            .insurance_providers
            .find_by("code", FieldValue::from(code.clone()))
            .await?
            .into_iter()
            .any(|other| other.id != id);
        if duplicate {
            return Err(InsuranceError::Conflict(format!(
                "insurance provider code '{code}' is already in use"
            )));
        }

        Ok(InsuranceProvider {
            id,
            code,
            name: required("name", &input.name)?,
            kind: input.kind,
            phone: input.phone,
            is_active: input.is_active,
            audit: audit.unwrap_or_default(),
        })
    }

    // ---- Plans ----

    pub async fn create_plan(
        &self,
        input: PlanInput,
        actor: Option<Uuid>,
    ) -> InsuranceResult<InsurancePlan> {
        let plan = self.build_plan(Uuid::new_v4(), input, None).await?;
        let plan = self.repos.insurance_plans.insert(plan, actor).await?;
        info!(plan_id = %plan.id, tier = %plan.tier, "Insurance plan created");
        Ok(plan)
    }

    pub async fn update_plan(
        &self,
        id: Uuid,
        input: PlanInput,
        actor: Option<Uuid>,
    ) -> InsuranceResult<InsurancePlan> {
        let existing = self.repos.insurance_plans.get(id).await?;
        let plan = self.build_plan(id, input, Some(existing.audit)).await?;
        Ok(self.repos.insurance_plans.update(plan, actor).await?)
    }

    async fn build_plan(&self, id: Uuid, input: PlanInput, audit: Option<AuditInfo>) -> InsuranceResult<InsurancePlan> {
        check_percent("default_coverage_percent", input.default_coverage_percent)?;
        check_percent("deductible_percent", input.deductible_percent)?;
        check_range(input.effective_from, input.effective_to)?;
        self.repos.insurance_providers.get(input.provider_id).await?;

        Ok(InsurancePlan {
            id,
            provider_id: input.provider_id,
            name: required("name", &input.name)?,
            tier: input.tier,
            default_coverage_percent: input.default_coverage_percent,
            deductible_percent: input.deductible_percent,
            effective_from: input.effective_from,
            effective_to: input.effective_to,
            is_active: input.is_active,
            audit: audit.unwrap_or_default(),
        })
    }

    // ---- Plan services ----

    pub async fn create_plan_service(
        &self,
        input: PlanServiceInput,
        actor: Option<Uuid>,
    ) -> InsuranceResult<PlanService> {
        let rule = self.build_plan_service(Uuid::new_v4(), input, None).await?;
        Ok(self.repos.plan_services.insert(rule, actor).await?)
    }

    pub async fn update_plan_service(
        &self,
        id: Uuid,
        input: PlanServiceInput,
        actor: Option<Uuid>,
    ) -> InsuranceResult<PlanService> {
        let existing = self.repos.plan_services.get(id).await?;
        let rule = self.build_plan_service(id, input, Some(existing.audit)).await?;
        Ok(self.repos.plan_services.update(rule, actor).await?)
    }

    async fn build_plan_service(&self, id: Uuid, input: PlanServiceInput, audit: Option<AuditInfo>) -> InsuranceResult<PlanService> {
        if let Some(percent) = input.coverage_percent {
            check_percent("coverage_percent", percent)?;
        }
        if let Some(copay) = input.copay_amount {
            check_amount("copay_amount", copay)?;
        }
        if let Some(cap) = input.max_coverage_amount {
            check_amount("max_coverage_amount", cap)?;
        }
        self.repos.insurance_plans.get(input.plan_id).await?;
        self.repos.service_categories.get(input.category_id).await?;

        if let Some(other) = self.plan_service_for(input.plan_id, input.category_id).await? {
            if other.id != id {
                return Err(InsuranceError::Conflict(
                    "the plan already has a rule for this service category".to_string(),
                ));
            }
        }

        Ok(PlanService {
            id,
            plan_id: input.plan_id,
            category_id: input.category_id,
            is_covered: input.is_covered,
            coverage_percent: input.coverage_percent,
            copay_amount: input.copay_amount,
            max_coverage_amount: input.max_coverage_amount,
            audit: audit.unwrap_or_default(),
        })
    }

    /// Live coverage rule of a plan for a category
    pub async fn plan_service_for(
        &self,
        plan_id: Uuid,
        category_id: Uuid,
    ) -> InsuranceResult<Option<PlanService>> {
        let rule = self
            .repos
            .plan_services
            .find_by("plan_id", FieldValue::from(plan_id))
            .await?
            .into_iter()
            .find(|rule| rule.category_id == category_id);
        Ok(rule)
    }

    // ---- Tariffs ----

    pub async fn create_tariff(
        &self,
        input: TariffInput,
        actor: Option<Uuid>,
    ) -> InsuranceResult<InsuranceTariff> {
        let tariff = self.build_tariff(Uuid::new_v4(), input, None).await?;
        Ok(self.repos.insurance_tariffs.insert(tariff, actor).await?)
    }

    pub async fn update_tariff(
        &self,
        id: Uuid,
        input: TariffInput,
        actor: Option<Uuid>,
    ) -> InsuranceResult<InsuranceTariff> {
        let existing = self.repos.insurance_tariffs.get(id).await?;
        let tariff = self.build_tariff(id, input, Some(existing.audit)).await?;
        Ok(self.repos.insurance_tariffs.update(tariff, actor).await?)
    }

    async fn build_tariff(&self, id: Uuid, input: TariffInput, audit: Option<AuditInfo>) -> InsuranceResult<InsuranceTariff> {
        check_amount("total_price", input.total_price)?;
        if let Some(share) = input.insurer_share {
            check_amount("insurer_share", share)?;
            if share > input.total_price {
                return Err(InsuranceError::Validation(
                    "insurer_share cannot exceed total_price".to_string(),
                ));
            }
        }
        check_range(input.effective_from, input.effective_to)?;
        self.repos.insurance_plans.get(input.plan_id).await?;
        self.repos.medical_services.get(input.service_id).await?;

        Ok(InsuranceTariff {
            id,
            plan_id: input.plan_id,
            service_id: input.service_id,
            total_price: input.total_price,
            insurer_share: input.insurer_share,
            effective_from: input.effective_from,
            effective_to: input.effective_to,
            audit: audit.unwrap_or_default(),
        })
    }

    /// Tariff of a service under a plan on a day
    ///
    /// Among overlapping tariffs the latest `effective_from` wins, then the
    /// most recently created.
    pub async fn tariff_for(
        &self,
        plan_id: Uuid,
        service_id: Uuid,
        on_date: NaiveDate,
    ) -> InsuranceResult<Option<InsuranceTariff>> {
        let tariff = self
            .repos
            .insurance_tariffs
            .find_by("plan_id", FieldValue::from(plan_id))
            .await?
            .into_iter()
            .filter(|tariff| tariff.service_id == service_id && tariff.is_effective_on(on_date))
            .max_by(|a, b| {
                a.effective_from
                    .cmp(&b.effective_from)
                    .then_with(|| a.audit.created_at.cmp(&b.audit.created_at))
            });
        Ok(tariff)
    }

    // ---- Patient insurances ----

    pub async fn add_patient_insurance(
        &self,
        patient_id: Uuid,
        input: PatientInsuranceInput,
        actor: Option<Uuid>,
    ) -> InsuranceResult<PatientInsurance> {
        let insurance = self
            .build_patient_insurance(Uuid::new_v4(), patient_id, input, None)
            .await?;
        let insurance = self.repos.patient_insurances.insert(insurance, actor).await?;
        info!(%patient_id, insurance_id = %insurance.id, kind = %insurance.kind, "Patient insurance added");
        Ok(insurance)
    }

    pub async fn update_patient_insurance(
        &self,
        patient_id: Uuid,
        id: Uuid,
        input: PatientInsuranceInput,
        actor: Option<Uuid>,
    ) -> InsuranceResult<PatientInsurance> {
        let existing = self.patient_insurance(patient_id, id).await?;
        let insurance = self
            .build_patient_insurance(id, patient_id, input, Some(existing.audit))
            .await?;
        Ok(self.repos.patient_insurances.update(insurance, actor).await?)
    }

    /// A live insurance that belongs to the patient
    pub async fn patient_insurance(
        &self,
        patient_id: Uuid,
        id: Uuid,
    ) -> InsuranceResult<PatientInsurance> {
        let insurance = self.repos.patient_insurances.get(id).await?;
        if insurance.patient_id != patient_id {
            return Err(database_layer::DatabaseError::not_found(PatientInsurance::RESOURCE, id).into());
        }
        Ok(insurance)
    }

    async fn build_patient_insurance(&self, id: Uuid, patient_id: Uuid, input: PatientInsuranceInput, audit: Option<AuditInfo>) -> InsuranceResult<PatientInsurance> {
        check_range(input.valid_from, input.valid_to)?;
        if input.priority < 0 {
            return Err(InsuranceError::Validation("priority cannot be negative".to_string()));
        }
        self.repos.patients.get(patient_id).await?;
        let plan = self.repos.insurance_plans.get(input.plan_id).await?;
        let provider = self.repos.insurance_providers.get(plan.provider_id).await?;
        if provider.kind != input.kind {
            return Err(InsuranceError::Validation(format!(
                "{} is a {} insurer",
                provider.name, provider.kind
            )));
        }

        Ok(PatientInsurance {
            id,
            patient_id,
            plan_id: input.plan_id,
            policy_number: required("policy_number", &input.policy_number)?,
            kind: input.kind,
            priority: input.priority,
            valid_from: input.valid_from,
            valid_to: input.valid_to,
            audit: audit.unwrap_or_default(),
        })
    }

    // ---- Coverage ----

    /// Price and split one service line for the given coverage
    pub async fn calculate_line(
        &self,
        coverage: &ResolvedCoverage,
        service: &MedicalService,
        quantity: i32,
        on_date: NaiveDate,
    ) -> InsuranceResult<LineCoverage> {
        let primary = match &coverage.primary {
            Some(applied) => Some(self.slot_for(&applied.plan, service, on_date).await?),
            None => None,
        };
        let supplementary = match &coverage.supplementary {
            Some(applied) => Some(self.slot_for(&applied.plan, service, on_date).await?),
            None => None,
        };

        let line = self.calculator.calculate(
            quantity,
            service.base_price,
            primary.as_ref(),
            supplementary.as_ref(),
        )?;
        debug!(
            service_id = %service.id,
            base = %line.base_amount,
            insurer = %line.insurer_total(),
            patient = %line.patient_share,
            "Line coverage calculated"
        );
        Ok(line)
    }

    async fn slot_for(&self, plan: &InsurancePlan, service: &MedicalService, on_date: NaiveDate) -> InsuranceResult<CoverageSlot> {
        Ok(CoverageSlot {
            plan: plan.clone(),
            plan_service: self.plan_service_for(plan.id, service.category_id).await?,
            tariff: self.tariff_for(plan.id, service.id, on_date).await?,
        })
    }

    /// Calculation for a patient and service without storing anything
    pub async fn preview(
        &self,
        patient_id: Uuid,
        service_id: Uuid,
        quantity: i32,
        on_date: NaiveDate,
    ) -> InsuranceResult<CoveragePreview> {
        let service = self.repos.medical_services.get(service_id).await?;
        let coverage = self.resolve_coverage(patient_id, on_date, None, None).await?;
        let line = self.calculate_line(&coverage, &service, quantity, on_date).await?;
        Ok(CoveragePreview {
            on_date,
            service,
            coverage,
            line,
        })
    }

    pub(crate) fn repos(&self) -> &Repositories {
        &self.repos
    }
}
