// Patient registry
use database_layer::{
    AuditInfo, DatabaseError, Entity, FieldValue, ListQuery, Page, Patient, NUMBERING_ATTEMPTS,
};
use logger_redacted::{redacted_info, redacted_warn};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{ReceptionError, ReceptionResult};
use crate::identity::{is_valid_mobile, is_valid_national_code, normalize_digits};
use crate::models::PatientInput;
use crate::service::{optional, required, ReceptionService};

/// Width of clinic file numbers
const FILE_NUMBER_DIGITS: usize = 6;

fn file_number(sequence: u64) -> String {
    format!("{:0width$}", sequence, width = FILE_NUMBER_DIGITS)
}

impl ReceptionService {
    pub async fn patients(&self, query: &ListQuery) -> ReceptionResult<Page<Patient>> {
        Ok(self.repos().patients.list(query).await?)
    }

    pub async fn patient(&self, id: Uuid) -> ReceptionResult<Patient> {
        Ok(self.repos().patients.get(id).await?)
    }

    /// Register a new patient and give them the next file number
    pub async fn register_patient(
        &self,
        input: PatientInput,
        actor: Option<Uuid>,
    ) -> ReceptionResult<Patient> {
        let id = Uuid::new_v4();
        let mut patient = self.build_patient(id, input).await?;
        let mut sequence = self.last_file_number().await? + 1;
        patient.file_number = file_number(sequence);

        let mut attempts = 1;
        let patient = loop {
            match self.repos().patients.insert(patient.clone(), actor).await {
                Ok(stored) => break stored,
                Err(err) if err.is_conflict_on("file_number") && attempts < NUMBERING_ATTEMPTS => {
                    attempts += 1;
                    debug!(file_number = %patient.file_number, "File number taken, retrying");
                    sequence = (sequence + 1).max(self.last_file_number().await? + 1);
                    patient.file_number = file_number(sequence);
                }
                Err(err) => return Err(err.into()),
            }
        };
        redacted_info!(
            "Patient registered: file {} national code {}",
            patient.file_number,
            patient.national_code
        );
        Ok(patient)
    }

    pub async fn update_patient(
        &self,
        id: Uuid,
        input: PatientInput,
        actor: Option<Uuid>,
    ) -> ReceptionResult<Patient> {
        let existing = self.repos().patients.get(id).await?;
        let mut patient = self.build_patient(id, input).await?;
        patient.file_number = existing.file_number;
        patient.audit = existing.audit;
        Ok(self.repos().patients.update(patient, actor).await?)
    }

    /// Soft delete; refused while the patient has an open reception
    pub async fn delete_patient(&self, id: Uuid, actor: Option<Uuid>) -> ReceptionResult<Patient> {
        self.repos().patients.get(id).await?;
        let open = self
            .repos()
            .receptions
            .find_by("patient_id", FieldValue::from(id))
            .await?
            .into_iter()
            .any(|reception| reception.status.is_open());
        if open {
            return Err(ReceptionError::Locked(
                "the patient has an open reception".to_string(),
            ));
        }

        let patient = self.repos().patients.soft_delete(id, actor).await?;
        info!(patient_id = %id, "Patient deleted");
        Ok(patient)
    }

    /// Undo a delete, unless another live patient took the national code meanwhile
    pub async fn restore_patient(&self, id: Uuid, actor: Option<Uuid>) -> ReceptionResult<Patient> {
        let patient = self
            .repos()
            .patients
            .find_including_deleted(id)
            .await?
            .ok_or_else(|| DatabaseError::not_found(Patient::RESOURCE, id))?;
        self.ensure_unique_national_code(id, &patient.national_code).await?;
        Ok(self.repos().patients.restore(id, actor).await?)
    }

    async fn build_patient(&self, id: Uuid, input: PatientInput) -> ReceptionResult<Patient> {
        let national_code = normalize_digits(&input.national_code);
        if !is_valid_national_code(&national_code) {
            return Err(ReceptionError::Validation(
                "national code is not valid".to_string(),
            ));
        }
        let mobile = optional(input.mobile).map(|m| normalize_digits(&m));
        if let Some(mobile) = &mobile {
            if !is_valid_mobile(mobile) {
                return Err(ReceptionError::Validation(
                    "mobile must look like 09xxxxxxxxx".to_string(),
                ));
            }
        }
        if let Some(birth_date) = input.birth_date {
            if birth_date > chrono::Utc::now().date_naive() {
                return Err(ReceptionError::Validation(
                    "birth date cannot be in the future".to_string(),
                ));
            }
        }
        self.ensure_unique_national_code(id, &national_code).await?;

        Ok(Patient {
            id,
            first_name: required("first_name", &input.first_name)?,
            last_name: required("last_name", &input.last_name)?,
            father_name: optional(input.father_name),
            national_code,
            file_number: String::new(),
            birth_date: input.birth_date,
            gender: input.gender,
            mobile,
            address: optional(input.address),
            audit: AuditInfo::default(),
        })
    }

    async fn ensure_unique_national_code(
        &self,
        id: Uuid,
        national_code: &str,
    ) -> ReceptionResult<()> {
        let taken = self
            .repos()
            .patients
            .find_by("national_code", FieldValue::from(national_code))
            .await?
            .into_iter()
            .any(|other| other.id != id);
        if taken {
            redacted_warn!("Duplicate national code {}", national_code);
            return Err(ReceptionError::Conflict(
                "a patient with this national code is already registered".to_string(),
            ));
        }
        Ok(())
    }

    /// Highest file number handed out so far, deleted patients included
    async fn last_file_number(&self) -> ReceptionResult<u64> {
        let query = ListQuery::new()
            .with_sort("file_number", true)
            .with_page(1, 1)
            .including_deleted(true);
        Ok(self
            .repos()
            .patients
            .list(&query)
            .await?
            .items
            .first()
            .and_then(|p| p.file_number.parse::<u64>().ok())
            .unwrap_or(0))
    }
}
