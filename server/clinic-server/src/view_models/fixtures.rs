//! Test clinic: one patient with a 70% primary plan, one doctor, one visit
//! service priced 1,000,000 Rials

use billing_service::PaymentInput;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use database_layer::{
    CoverageKind, Doctor, Gender, MedicalService, Patient, Payment, PaymentMethod, PlanTier,
    Repositories,
};
use insurance_service::{PatientInsuranceInput, PlanInput, PlanServiceInput, ProviderInput};
use reception_service::{
    AddServiceInput, DoctorInput, MedicalServiceInput, PatientInput, ReceptionInput,
    ReceptionService, ServiceCategoryInput,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

pub fn visit_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, 3).unwrap()
}

/// 09:30 in Tehran on 1403/01/15
pub fn visit_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, 3, 6, 0, 0).unwrap()
}

pub struct Clinic {
    pub service: ReceptionService,
    pub patient: Patient,
    pub doctor: Doctor,
    pub visit: MedicalService,
}

pub async fn clinic() -> Clinic {
    let service = ReceptionService::new(Repositories::in_memory());
    let patient = service
        .register_patient(
            PatientInput {
                first_name: "سارا".to_string(),
                last_name: "احمدی".to_string(),
                father_name: None,
                national_code: "0499370899".to_string(),
                birth_date: None,
                gender: Gender::Female,
                mobile: Some("09121234567".to_string()),
                address: None,
            },
            None,
        )
        .await
        .unwrap();
    let doctor = service
        .create_doctor(
            DoctorInput {
                first_name: "حمید".to_string(),
                last_name: "نوری".to_string(),
                medical_council_code: "M-12345".to_string(),
                specialty: "پزشک عمومی".to_string(),
                mobile: None,
                is_active: true,
            },
            None,
        )
        .await
        .unwrap();
    let category = service
        .create_category(
            ServiceCategoryInput {
                code: "visit".to_string(),
                name: "ویزیت".to_string(),
            },
            None,
        )
        .await
        .unwrap();
    let visit = service
        .create_medical_service(
            MedicalServiceInput {
                category_id: category.id,
                code: "v-gp".to_string(),
                name: "ویزیت پزشک عمومی".to_string(),
                base_price: dec!(1000000),
                is_active: true,
            },
            None,
        )
        .await
        .unwrap();

    let insurance = service.insurance();
    let provider = insurance
        .create_provider(
            ProviderInput {
                code: "TAMIN".to_string(),
                name: "تامین اجتماعی".to_string(),
                kind: CoverageKind::Primary,
                phone: None,
                is_active: true,
            },
            None,
        )
        .await
        .unwrap();
    let plan = insurance
        .create_plan(
            PlanInput {
                provider_id: provider.id,
                name: "Standard".to_string(),
                tier: PlanTier::Standard,
                default_coverage_percent: dec!(70),
                deductible_percent: Decimal::ZERO,
                effective_from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                effective_to: None,
                is_active: true,
            },
            None,
        )
        .await
        .unwrap();
    insurance
        .create_plan_service(
            PlanServiceInput {
                plan_id: plan.id,
                category_id: category.id,
                is_covered: true,
                coverage_percent: None,
                copay_amount: None,
                max_coverage_amount: None,
            },
            None,
        )
        .await
        .unwrap();
    insurance
        .add_patient_insurance(
            patient.id,
            PatientInsuranceInput {
                plan_id: plan.id,
                policy_number: "TM-55".to_string(),
                kind: CoverageKind::Primary,
                priority: 1,
                valid_from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                valid_to: None,
            },
            None,
        )
        .await
        .unwrap();

    Clinic {
        service,
        patient,
        doctor,
        visit,
    }
}

impl Clinic {
    pub async fn reception(&self) -> Uuid {
        self.service
            .create_reception(
                ReceptionInput {
                    patient_id: self.patient.id,
                    doctor_id: self.doctor.id,
                    received_at: Some(visit_time()),
                    primary_insurance_id: None,
                    supplementary_insurance_id: None,
                    notes: None,
                },
                None,
            )
            .await
            .unwrap()
            .id
    }

    pub async fn reception_with_visit(&self) -> Uuid {
        let reception_id = self.reception().await;
        self.service
            .add_service(
                reception_id,
                AddServiceInput {
                    service_id: self.visit.id,
                    quantity: 1,
                },
                None,
            )
            .await
            .unwrap();
        reception_id
    }

    pub fn payment_input(amount: Decimal, method: PaymentMethod) -> PaymentInput {
        PaymentInput {
            amount,
            method,
            reference_number: None,
            paid_at: Some(visit_time()),
        }
    }

    pub async fn pay(&self, reception_id: Uuid, amount: Decimal) -> Payment {
        self.service
            .billing()
            .record_payment(reception_id, Self::payment_input(amount, PaymentMethod::Pos), None)
            .await
            .unwrap()
    }

    pub async fn refund(&self, reception_id: Uuid, amount: Decimal) -> Payment {
        self.service
            .billing()
            .record_refund(reception_id, Self::payment_input(amount, PaymentMethod::Cash), None)
            .await
            .unwrap()
    }
}
