// Doctors, service categories and medical services
use database_layer::{
    AuditInfo, Doctor, FieldValue, ListQuery, MedicalService, Page, ServiceCategory,
};
use tracing::info;
use uuid::Uuid;

use crate::error::{ReceptionError, ReceptionResult};
use crate::identity::{is_valid_mobile, normalize_digits};
use crate::models::{DoctorInput, MedicalServiceInput, ServiceCategoryInput};
use crate::service::{optional, required, ReceptionService};

impl ReceptionService {
    // ---- Doctors ----

    pub async fn doctors(&self, query: &ListQuery) -> ReceptionResult<Page<Doctor>> {
        Ok(self.repos().doctors.list(query).await?)
    }

    pub async fn create_doctor(
        &self,
        input: DoctorInput,
        actor: Option<Uuid>,
    ) -> ReceptionResult<Doctor> {
        let doctor = self.build_doctor(Uuid::new_v4(), input).await?;
        let doctor = self.repos().doctors.insert(doctor, actor).await?;
        info!(doctor_id = %doctor.id, code = %doctor.medical_council_code, "Doctor created");
        Ok(doctor)
    }

    pub async fn update_doctor(
        &self,
        id: Uuid,
        input: DoctorInput,
        actor: Option<Uuid>,
    ) -> ReceptionResult<Doctor> {
        let existing = self.repos().doctors.get(id).await?;
        let mut doctor = self.build_doctor(id, input).await?;
        doctor.audit = existing.audit;
        Ok(self.repos().doctors.update(doctor, actor).await?)
    }

    async fn build_doctor(&self, id: Uuid, input: DoctorInput) -> ReceptionResult<Doctor> {
        let code = required("medical_council_code", &input.medical_council_code)?;
        let taken = self
            .repos()
            .doctors
            .find_by("medical_council_code", FieldValue::from(code.clone()))
            .await?
            .into_iter()
            .any(|other| other.id != id);
        if taken {
            return Err(ReceptionError::Conflict(format!(
                "medical council code '{code}' is already in use"
            )));
        }
        let mobile = optional(input.mobile).map(|m| normalize_digits(&m));
        if mobile.as_deref().is_some_and(|m| !is_valid_mobile(m)) {
            return Err(ReceptionError::Validation(
                "mobile must look like 09xxxxxxxxx".to_string(),
            ));
        }

        Ok(Doctor {
            id,
            first_name: required("first_name", &input.first_name)?,
            last_name: required("last_name", &input.last_name)?,
            medical_council_code: code,
            specialty: required("specialty", &input.specialty)?,
            mobile,
            is_active: input.is_active,
            audit: AuditInfo::default(),
        })
    }

    // ---- Service categories ----

    pub async fn service_categories(
        &self,
        query: &ListQuery,
    ) -> ReceptionResult<Page<ServiceCategory>> {
        Ok(self.repos().service_categories.list(query).await?)
    }

    pub async fn create_category(
        &self,
        input: ServiceCategoryInput,
        actor: Option<Uuid>,
    ) -> ReceptionResult<ServiceCategory> {
        let category = self.build_category(Uuid::new_v4(), input).await?;
        Ok(self.repos().service_categories.insert(category, actor).await?)
    }

    pub async fn update_category(
        &self,
        id: Uuid,
        input: ServiceCategoryInput,
        actor: Option<Uuid>,
    ) -> ReceptionResult<ServiceCategory> {
        let existing = self.repos().service_categories.get(id).await?;
        let mut category = self.build_category(id, input).await?;
        category.audit = existing.audit;
        Ok(self.repos().service_categories.update(category, actor).await?)
    }

    /// Soft delete; a category that still holds live services stays
    pub async fn delete_category(
        &self,
        id: Uuid,
        actor: Option<Uuid>,
    ) -> ReceptionResult<ServiceCategory> {
        let in_use = !self
            .repos()
            .medical_services
            .find_by("category_id", FieldValue::from(id))
            .await?
            .is_empty();
        if in_use {
            return Err(ReceptionError::Conflict(
                "the category still has services".to_string(),
            ));
        }
        Ok(self.repos().service_categories.soft_delete(id, actor).await?)
    }

    async fn build_category(
        &self,
        id: Uuid,
        input: ServiceCategoryInput,
    ) -> ReceptionResult<ServiceCategory> {
        let code = required("code", &input.code)?.to_uppercase();
        let taken = self
            .repos()
            .service_categories
            .find_by("code", FieldValue::from(code.clone()))
            .await?
            .into_iter()
            .any(|other| other.id != id);
        if taken {
            return Err(ReceptionError::Conflict(format!(
                "service category code '{code}' is already in use"
            )));
        }
        Ok(ServiceCategory {
            id,
            code,
            name: required("name", &input.name)?,
            audit: AuditInfo::default(),
        })
    }

    // ---- Medical services ----

    pub async fn medical_services(
        &self,
        query: &ListQuery,
    ) -> ReceptionResult<Page<MedicalService>> {
        Ok(self.repos().medical_services.list(query).await?)
    }

    pub async fn create_medical_service(
        &self,
        input: MedicalServiceInput,
        actor: Option<Uuid>,
    ) -> ReceptionResult<MedicalService> {
        let service = self.build_medical_service(Uuid::new_v4(), input).await?;
        let service = self.repos().medical_services.insert(service, actor).await?;
        info!(
            service_id = %service.id,
            code = %service.code,
            price = %service.base_price,
            "Medical service created"
        );
        Ok(service)
    }

    pub async fn update_medical_service(
        &self,
        id: Uuid,
        input: MedicalServiceInput,
        actor: Option<Uuid>,
    ) -> ReceptionResult<MedicalService> {
        let existing = self.repos().medical_services.get(id).await?;
        let mut service = self.build_medical_service(id, input).await?;
        service.audit = existing.audit;
        Ok(self.repos().medical_services.update(service, actor).await?)
    }

    async fn build_medical_service(
        &self,
        id: Uuid,
        input: MedicalServiceInput,
    ) -> ReceptionResult<MedicalService> {
        self.repos().service_categories.get(input.category_id).await?;
        if input.base_price.is_sign_negative() || !input.base_price.fract().is_zero() {
            return Err(ReceptionError::Validation(
                "base_price must be a non-negative whole number of Rials".to_string(),
            ));
        }
        let code = required("code", &input.code)?.to_uppercase();
        let taken = self
            .repos()
            .medical_services
            .find_by("code", FieldValue::from(code.clone()))
            .await?
            .into_iter()
            .any(|other| other.id != id);
        if taken {
            return Err(ReceptionError::Conflict(format!(
                "medical service code '{code}' is already in use"
            )));
        }

        Ok(MedicalService {
            id,
            category_id: input.category_id,
            code,
            name: required("name", &input.name)?,
            base_price: input.base_price,
            is_active: input.is_active,
            audit: AuditInfo::default(),
        })
    }
}
