// Reception lifecycle: numbering, service lines, calculations and status
use billing_service::Balance;
use chrono::{NaiveDate, Utc};
use database_layer::{
    AuditInfo, DatabaseError, FieldValue, InsuranceCalculation, ListQuery, Page,
    Reception, ReceptionService as ServiceLine, ReceptionStatus, NUMBERING_ATTEMPTS,
};
use insurance_service::{LineCoverage, ResolvedCoverage};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::calendar::{clinic_day, JalaliDate};
use crate::error::{ReceptionError, ReceptionResult};
use crate::models::{AddServiceInput, ReceptionDetails, ReceptionInput, ReceptionLine};
use crate::service::{optional, ReceptionService};

/// Width of the daily sequence appended to the Jalali date
const DAILY_SEQUENCE_DIGITS: usize = 4;

/// `1403/01/15`, 7th reception of the day -> `140301150007`
pub fn reception_number(day: NaiveDate, sequence: u64) -> String {
    format!(
        "{}{:0width$}",
        JalaliDate::from_gregorian(day).compact(),
        sequence,
        width = DAILY_SEQUENCE_DIGITS
    )
}

impl ReceptionService {
    pub async fn receptions(&self, query: &ListQuery) -> ReceptionResult<Page<Reception>> {
        Ok(self.repos().receptions.list(query).await?)
    }

    pub async fn reception(&self, id: Uuid) -> ReceptionResult<Reception> {
        Ok(self.repos().receptions.get(id).await?)
    }

    /// Open a visit for a patient with a doctor
    ///
    /// Insurances are resolved for the clinic-local day of `received_at`
    /// unless pinned in the input.
    pub async fn create_reception(
        &self,
        input: ReceptionInput,
        actor: Option<Uuid>,
    ) -> ReceptionResult<Reception> {
        let patient = self.repos().patients.get(input.patient_id).await?;
        let doctor = self.repos().doctors.get(input.doctor_id).await?;
        if !doctor.is_active {
            return Err(ReceptionError::Validation(format!(
                "doctor {} is not active",
                doctor.full_name()
            )));
        }

        let received_at = input.received_at.unwrap_or_else(Utc::now);
        let reception_day = clinic_day(received_at);
        let coverage = self
            .insurance()
            .resolve_coverage(
                patient.id,
                reception_day,
                input.primary_insurance_id,
                input.supplementary_insurance_id,
            )
            .await?;

        let mut sequence = self.daily_count(reception_day).await? + 1;
        let mut reception = Reception {
            id: Uuid::new_v4(),
            patient_id: patient.id,
            doctor_id: doctor.id,
            reception_number: reception_number(reception_day, sequence),
            reception_day,
            received_at,
            status: ReceptionStatus::Registered,
            primary_insurance_id: coverage.primary_insurance_id(),
            supplementary_insurance_id: coverage.supplementary_insurance_id(),
            notes: optional(input.notes),
            audit: AuditInfo::default(),
        };
        let mut attempts = 1;
        let reception = loop {
            match self.repos().receptions.insert(reception.clone(), actor).await {
                Ok(stored) => break stored,
                Err(err)
                    if err.is_conflict_on("reception_number") && attempts < NUMBERING_ATTEMPTS =>
                {
                    attempts += 1;
                    debug!(
                        reception_number = %reception.reception_number,
                        "Reception number taken, retrying"
                    );
                    sequence = (sequence + 1).max(self.daily_count(reception_day).await? + 1);
                    reception.reception_number = reception_number(reception_day, sequence);
                }
                Err(err) => return Err(err.into()),
            }
        };

        info!(
            reception_id = %reception.id,
            reception_number = %reception.reception_number,
            doctor_id = %doctor.id,
            insured = !coverage.is_empty(),
            "Reception created"
        );
        Ok(reception)
    }

    /// Receptions ever opened on `day`, deleted ones included
    async fn daily_count(&self, day: NaiveDate) -> ReceptionResult<u64> {
        let same_day = ListQuery::new()
            .with_filter("reception_day", day.to_string())
            .including_deleted(true);
        Ok(self.repos().receptions.count(&same_day).await?)
    }

    /// Add a service line and its insurance calculation
    pub async fn add_service(
        &self,
        reception_id: Uuid,
        input: AddServiceInput,
        actor: Option<Uuid>,
    ) -> ReceptionResult<ReceptionLine> {
        let reception = self.editable_reception(reception_id).await?;
        if input.quantity < 1 {
            return Err(ReceptionError::Validation(
                "quantity must be at least 1".to_string(),
            ));
        }
        let service = self.repos().medical_services.get(input.service_id).await?;
        if !service.is_active {
            return Err(ReceptionError::Validation(format!(
                "service {} is not offered any more",
                service.code
            )));
        }

        let coverage = self.recorded_coverage(&reception).await?;
        let priced = self
            .insurance()
            .calculate_line(&coverage, &service, input.quantity, reception.reception_day)
            .await?;

        let line = ServiceLine {
            id: Uuid::new_v4(),
            reception_id,
            service_id: service.id,
            quantity: input.quantity,
            unit_price: priced.unit_price,
            total_price: priced.base_amount,
            audit: AuditInfo::default(),
        };
        let line = self.repos().reception_services.insert(line, actor).await?;
        let calculation = self
            .repos()
            .insurance_calculations
            .insert(calculation_for(&line, &priced), actor)
            .await?;

        info!(
            reception_id = %reception_id,
            line_id = %line.id,
            service = %service.code,
            quantity = line.quantity,
            patient_share = %calculation.patient_share,
            "Service added to reception"
        );
        Ok(ReceptionLine {
            line,
            service,
            calculation: Some(calculation),
        })
    }

    /// Drop a service line; not possible once money has changed hands
    pub async fn remove_service(
        &self,
        reception_id: Uuid,
        line_id: Uuid,
        actor: Option<Uuid>,
    ) -> ReceptionResult<ServiceLine> {
        self.editable_reception(reception_id).await?;
        let line = self.repos().reception_services.get(line_id).await?;
        if line.reception_id != reception_id {
            return Err(DatabaseError::not_found("reception service", line_id).into());
        }
        if !self.billing().payments(reception_id).await?.is_empty() {
            return Err(ReceptionError::Locked(
                "services cannot be removed after a payment".to_string(),
            ));
        }

        for calculation in self.line_calculations(line_id).await? {
            self.repos()
                .insurance_calculations
                .soft_delete(calculation.id, actor)
                .await?;
        }
        let line = self.repos().reception_services.soft_delete(line_id, actor).await?;
        info!(reception_id = %reception_id, line_id = %line_id, "Service removed from reception");
        Ok(line)
    }

    /// Reprice every live line against current tariffs and plan rules
    ///
    /// Previous calculations are soft deleted so the history stays.
    pub async fn recalculate(
        &self,
        reception_id: Uuid,
        actor: Option<Uuid>,
    ) -> ReceptionResult<ReceptionDetails> {
        let reception = self.editable_reception(reception_id).await?;
        let coverage = self.recorded_coverage(&reception).await?;

        let lines = self
            .repos()
            .reception_services
            .find_by("reception_id", FieldValue::from(reception_id))
            .await?;
        for line in lines {
            let service = self
                .repos()
                .medical_services
                .get_including_deleted(line.service_id)
                .await?;
            let priced = self
                .insurance()
                .calculate_line(&coverage, &service, line.quantity, reception.reception_day)
                .await?;

            for old in self.line_calculations(line.id).await? {
                self.repos()
                    .insurance_calculations
                    .soft_delete(old.id, actor)
                    .await?;
            }

            let price_changed = line.unit_price != priced.unit_price
                || line.total_price != priced.base_amount;
            let line = if price_changed {
                debug!(
                    line_id = %line.id,
                    old = %line.total_price,
                    new = %priced.base_amount,
                    "Line repriced"
                );
                let mut repriced = line;
                repriced.unit_price = priced.unit_price;
                repriced.total_price = priced.base_amount;
                self.repos().reception_services.update(repriced, actor).await?
            } else {
                line
            };
            self.repos()
                .insurance_calculations
                .insert(calculation_for(&line, &priced), actor)
                .await?;
        }

        info!(reception_id = %reception_id, "Reception recalculated");
        self.reception_details(reception_id).await
    }

    /// Move a reception along its lifecycle
    pub async fn change_status(
        &self,
        reception_id: Uuid,
        next: ReceptionStatus,
        actor: Option<Uuid>,
    ) -> ReceptionResult<Reception> {
        let mut reception = self.repos().receptions.get(reception_id).await?;
        let current = reception.status;
        if !current.can_transition_to(next) {
            return Err(ReceptionError::transition(current, next, "not an allowed step"));
        }

        let balance = self.billing().balance(reception_id).await?;
        match next {
            ReceptionStatus::Completed => {
                let lines = self
                    .repos()
                    .reception_services
                    .find_by("reception_id", FieldValue::from(reception_id))
                    .await?;
                if lines.is_empty() {
                    return Err(ReceptionError::transition(current, next, "no services recorded"));
                }
                if !balance.is_settled() {
                    return Err(ReceptionError::transition(
                        current,
                        next,
                        format!("outstanding balance is {}", balance.outstanding),
                    ));
                }
            }
            ReceptionStatus::Cancelled => {
                if balance.net_paid != Decimal::ZERO {
                    return Err(ReceptionError::transition(
                        current,
                        next,
                        format!("{} has been paid and must be refunded first", balance.net_paid),
                    ));
                }
            }
            ReceptionStatus::Registered | ReceptionStatus::InProgress => {}
        }

        reception.status = next;
        let reception = self.repos().receptions.update(reception, actor).await?;
        info!(
            reception_id = %reception_id,
            from = %current,
            to = %next,
            "Reception status changed"
        );
        Ok(reception)
    }

    /// The reception with everything the screens need
    pub async fn reception_details(
        &self,
        reception_id: Uuid,
    ) -> ReceptionResult<ReceptionDetails> {
        let reception = self.repos().receptions.get(reception_id).await?;
        let repos = self.repos();
        let patient = repos.patients.get_including_deleted(reception.patient_id).await?;
        let doctor = repos.doctors.get_including_deleted(reception.doctor_id).await?;
        let coverage = self.recorded_coverage(&reception).await?;

        let calculations = self.billing().calculations(reception_id).await?;
        let mut lines = Vec::new();
        for line in self
            .repos()
            .reception_services
            .find_by("reception_id", FieldValue::from(reception_id))
            .await?
        {
            let service = self
                .repos()
                .medical_services
                .get_including_deleted(line.service_id)
                .await?;
            let calculation = calculations
                .iter()
                .find(|c| c.reception_service_id == line.id)
                .cloned();
            if calculation.is_none() {
                warn!(line_id = %line.id, "Service line has no live calculation");
            }
            lines.push(ReceptionLine {
                line,
                service,
                calculation,
            });
        }

        let payments = self.billing().payments(reception_id).await?;
        let balance = Balance::from_records(&calculations, &payments);

        Ok(ReceptionDetails {
            reception,
            patient,
            doctor,
            coverage,
            lines,
            payments,
            balance,
        })
    }

    async fn editable_reception(&self, reception_id: Uuid) -> ReceptionResult<Reception> {
        let reception = self.repos().receptions.get(reception_id).await?;
        if !reception.status.is_open() {
            return Err(ReceptionError::Locked(format!(
                "reception {} is {}",
                reception.reception_number, reception.status
            )));
        }
        Ok(reception)
    }

    async fn recorded_coverage(&self, reception: &Reception) -> ReceptionResult<ResolvedCoverage> {
        Ok(self
            .insurance()
            .coverage_of(reception.primary_insurance_id, reception.supplementary_insurance_id)
            .await?)
    }

    async fn line_calculations(
        &self,
        line_id: Uuid,
    ) -> ReceptionResult<Vec<InsuranceCalculation>> {
        Ok(self
            .repos()
            .insurance_calculations
            .find_by("reception_service_id", FieldValue::from(line_id))
            .await?)
    }
}

fn calculation_for(line: &ServiceLine, priced: &LineCoverage) -> InsuranceCalculation {
    InsuranceCalculation {
        id: Uuid::new_v4(),
        reception_id: line.reception_id,
        reception_service_id: line.id,
        primary_plan_id: priced.primary.as_ref().map(|s| s.plan_id),
        supplementary_plan_id: priced.supplementary.as_ref().map(|s| s.plan_id),
        base_amount: priced.base_amount,
        primary_share: priced.primary_share,
        supplementary_share: priced.supplementary_share,
        patient_share: priced.patient_share,
        deductible_amount: priced.deductible_amount,
        calculated_at: Utc::now(),
        audit: AuditInfo::default(),
    }
}
