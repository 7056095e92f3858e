use billing_service::{BillingError, PaymentInput};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use database_layer::{
    CoverageKind, Doctor, Gender, ListQuery, MedicalService, Patient, PaymentMethod, PlanTier,
    ReceptionStatus, Repositories, ServiceCategory,
};
use insurance_service::{
    PatientInsuranceInput, PlanInput, PlanServiceInput, ProviderInput, TariffInput,
};
use reception_service::{
    AddServiceInput, DoctorInput, MedicalServiceInput, PatientInput, ReceptionError,
    ReceptionInput, ReceptionService, ServiceCategoryInput,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// 09:30 in Tehran on 1403/01/15
fn visit_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, 3, 6, 0, 0).unwrap()
}

fn patient_input(national_code: &str) -> PatientInput {
    PatientInput {
        first_name: "Sara".to_string(),
        last_name: "Ahmadi".to_string(),
        father_name: Some("Hossein".to_string()),
        national_code: national_code.to_string(),
        birth_date: Some(date(1988, 2, 11)),
        gender: Gender::Female,
        mobile: Some("09121234567".to_string()),
        address: None,
    }
}

struct Clinic {
    service: ReceptionService,
    patient: Patient,
    doctor: Doctor,
    category: ServiceCategory,
    visit: MedicalService,
    plan_id: Uuid,
}

async fn clinic() -> Clinic {
    let service = ReceptionService::new(Repositories::in_memory());
    let patient = service
        .register_patient(patient_input("0499370899"), None)
        .await
        .unwrap();
    let doctor = service
        .create_doctor(
            DoctorInput {
                first_name: "Hamid".to_string(),
                last_name: "Nouri".to_string(),
                medical_council_code: "M-12345".to_string(),
                specialty: "General practice".to_string(),
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
                effective_from: date(2024, 1, 1),
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
                valid_from: date(2024, 1, 1),
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
        category,
        visit,
        plan_id: plan.id,
    }
}

impl Clinic {
    fn reception_input(&self) -> ReceptionInput {
        ReceptionInput {
            patient_id: self.patient.id,
            doctor_id: self.doctor.id,
            received_at: Some(visit_time()),
            primary_insurance_id: None,
            supplementary_insurance_id: None,
            notes: Some("  first visit ".to_string()),
        }
    }

    async fn reception_with_visit(&self) -> Uuid {
        let reception = self
            .service
            .create_reception(self.reception_input(), None)
            .await
            .unwrap();
        self.service
            .add_service(
                reception.id,
                AddServiceInput {
                    service_id: self.visit.id,
                    quantity: 1,
                },
                None,
            )
            .await
            .unwrap();
        reception.id
    }

    async fn pay(&self, reception_id: Uuid, amount: Decimal) {
        self.service
            .billing()
            .record_payment(
                reception_id,
                PaymentInput {
                    amount,
                    method: PaymentMethod::Cash,
                    reference_number: None,
                    paid_at: None,
                },
                None,
            )
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_file_numbers_are_sequential() {
    let c = clinic().await;
    assert_eq!(c.patient.file_number, "000001");
    assert_eq!(c.category.code, "VISIT");

    // Persian digits are normalised before the checksum
    let second = c
        .service
        .register_patient(patient_input("۰۰۱۲۳۴۵۶۷۹"), None)
        .await
        .unwrap();
    assert_eq!(second.national_code, "0012345679");
    assert_eq!(second.file_number, "000002");

    // Deleted patients keep their numbers
    c.service.delete_patient(second.id, None).await.unwrap();
    let third = c
        .service
        .register_patient(patient_input("1234567891"), None)
        .await
        .unwrap();
    assert_eq!(third.file_number, "000003");
}

#[tokio::test]
async fn test_patient_validation() {
    let c = clinic().await;
    let err = c
        .service
        .register_patient(patient_input("0499370898"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ReceptionError::Validation(_)));

    let err = c
        .service
        .register_patient(patient_input("0499370899"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ReceptionError::Conflict(_)));

    let mut input = patient_input("0067749828");
    input.mobile = Some("12345".to_string());
    let err = c.service.register_patient(input, None).await.unwrap_err();
    assert!(matches!(err, ReceptionError::Validation(_)));
}

#[tokio::test]
async fn test_update_keeps_file_number() {
    let c = clinic().await;
    let mut input = patient_input("0499370899");
    input.last_name = "Ahmadi-Rad".to_string();
    let updated = c
        .service
        .update_patient(c.patient.id, input, Some(Uuid::new_v4()))
        .await
        .unwrap();
    assert_eq!(updated.last_name, "Ahmadi-Rad");
    assert_eq!(updated.file_number, c.patient.file_number);
    assert_eq!(updated.audit.created_at, c.patient.audit.created_at);
}

#[tokio::test]
async fn test_restore_refuses_taken_national_code() {
    let c = clinic().await;
    c.service.delete_patient(c.patient.id, None).await.unwrap();
    c.service
        .register_patient(patient_input("0499370899"), None)
        .await
        .unwrap();

    let err = c.service.restore_patient(c.patient.id, None).await.unwrap_err();
    assert!(matches!(err, ReceptionError::Conflict(_)));
}

#[tokio::test]
async fn test_reception_numbering_and_coverage() {
    let c = clinic().await;
    let first = c
        .service
        .create_reception(c.reception_input(), None)
        .await
        .unwrap();
    assert_eq!(first.reception_number, "140301150001");
    assert_eq!(first.reception_day, date(2024, 4, 3));
    assert_eq!(first.status, ReceptionStatus::Registered);
    assert_eq!(first.notes.as_deref(), Some("first visit"));
    assert!(first.primary_insurance_id.is_some());
    assert!(first.supplementary_insurance_id.is_none());

    let second = c
        .service
        .create_reception(c.reception_input(), None)
        .await
        .unwrap();
    assert_eq!(second.reception_number, "140301150002");

    let mut late = c.reception_input();
    // 23:45 UTC is the next morning in Tehran
    late.received_at = Some(Utc.with_ymd_and_hms(2024, 4, 3, 23, 45, 0).unwrap());
    let next_day = c.service.create_reception(late, None).await.unwrap();
    assert_eq!(next_day.reception_number, "140301160001");

    let page = c
        .service
        .receptions(&ListQuery::new().with_filter("reception_day", "2024-04-03"))
        .await
        .unwrap();
    assert_eq!(page.total, 2);
}

/// Valid national code built from nine leading digits
fn national_code(seed: u32) -> String {
    let body = format!("{:09}", 310_000_000 + seed * 37);
    let sum: u32 = body
        .chars()
        .zip((2..=10).rev())
        .map(|(c, weight)| c.to_digit(10).unwrap() * weight)
        .sum();
    let r = sum % 11;
    let check = if r < 2 { r } else { 11 - r };
    format!("{body}{check}")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_receptions_get_distinct_numbers() {
    let c = clinic().await;
    let tasks: Vec<_> = (0..32)
        .map(|_| {
            let service = c.service.clone();
            let input = c.reception_input();
            tokio::spawn(async move { service.create_reception(input, None).await })
        })
        .collect();

    let mut numbers = Vec::new();
    for task in tasks {
        numbers.push(task.await.unwrap().unwrap().reception_number);
    }
    numbers.sort();
    let expected: Vec<String> = (1..=32).map(|n| format!("14030115{n:04}")).collect();
    assert_eq!(numbers, expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registrations_get_distinct_file_numbers() {
    let c = clinic().await;
    let tasks: Vec<_> = (0..24)
        .map(|i| {
            let service = c.service.clone();
            tokio::spawn(async move {
                service
                    .register_patient(patient_input(&national_code(i)), None)
                    .await
            })
        })
        .collect();

    let mut numbers = vec![c.patient.file_number.clone()];
    for task in tasks {
        numbers.push(task.await.unwrap().unwrap().file_number);
    }
    numbers.sort();
    let expected: Vec<String> = (1..=25).map(|n| format!("{n:06}")).collect();
    assert_eq!(numbers, expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_payments_get_distinct_receipts() {
    let c = clinic().await;
    let reception_id = c.reception_with_visit().await;
    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let billing = c.service.billing().clone();
            tokio::spawn(async move {
                billing
                    .record_payment(
                        reception_id,
                        PaymentInput {
                            amount: dec!(10000),
                            method: PaymentMethod::Pos,
                            reference_number: None,
                            paid_at: None,
                        },
                        None,
                    )
                    .await
            })
        })
        .collect();

    let mut receipts = Vec::new();
    for task in tasks {
        receipts.push(task.await.unwrap().unwrap().receipt_number);
    }
    receipts.sort();
    let expected: Vec<String> = (1..=16).map(|n| format!("140301150001-{n:02}")).collect();
    assert_eq!(receipts, expected);
}

#[tokio::test]
async fn test_inactive_doctor_cannot_receive() {
    let c = clinic().await;
    c.service
        .update_doctor(
            c.doctor.id,
            DoctorInput {
                first_name: "Hamid".to_string(),
                last_name: "Nouri".to_string(),
                medical_council_code: "M-12345".to_string(),
                specialty: "General practice".to_string(),
                mobile: None,
                is_active: false,
            },
            None,
        )
        .await
        .unwrap();
    let err = c
        .service
        .create_reception(c.reception_input(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ReceptionError::Validation(_)));
}

#[tokio::test]
async fn test_added_service_is_split_with_insurer() {
    let c = clinic().await;
    let reception_id = c.reception_with_visit().await;

    let details = c.service.reception_details(reception_id).await.unwrap();
    assert_eq!(details.lines.len(), 1);
    let calculation = details.lines[0].calculation.as_ref().unwrap();
    assert_eq!(calculation.primary_plan_id, Some(c.plan_id));
    assert_eq!(calculation.base_amount, dec!(1000000));
    assert_eq!(calculation.primary_share, dec!(700000));
    assert_eq!(calculation.patient_share, dec!(300000));
    assert_eq!(details.balance.outstanding, dec!(300000));
    assert_eq!(details.patient.id, c.patient.id);
    assert_eq!(details.coverage.primary.as_ref().unwrap().plan.id, c.plan_id);
    assert_eq!(details.base_total(), dec!(1000000));
    assert_eq!(details.primary_total(), dec!(700000));
}

#[tokio::test]
async fn test_quantity_must_be_positive() {
    let c = clinic().await;
    let reception = c
        .service
        .create_reception(c.reception_input(), None)
        .await
        .unwrap();
    let err = c
        .service
        .add_service(
            reception.id,
            AddServiceInput {
                service_id: c.visit.id,
                quantity: 0,
            },
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ReceptionError::Validation(_)));
}

#[tokio::test]
async fn test_remove_service_before_payment_only() {
    let c = clinic().await;
    let reception_id = c.reception_with_visit().await;
    let details = c.service.reception_details(reception_id).await.unwrap();
    let line_id = details.lines[0].line.id;

    let removed = c
        .service
        .remove_service(reception_id, line_id, None)
        .await
        .unwrap();
    assert!(removed.audit.is_deleted);
    let details = c.service.reception_details(reception_id).await.unwrap();
    assert!(details.lines.is_empty());
    assert_eq!(details.balance.patient_total, Decimal::ZERO);

    let reception_id = c.reception_with_visit().await;
    let line_id = c.service.reception_details(reception_id).await.unwrap().lines[0]
        .line
        .id;
    c.pay(reception_id, dec!(100000)).await;
    let err = c
        .service
        .remove_service(reception_id, line_id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ReceptionError::Locked(_)));
}

#[tokio::test]
async fn test_completion_requires_settled_balance() {
    let c = clinic().await;
    let reception_id = c.reception_with_visit().await;

    let err = c
        .service
        .change_status(reception_id, ReceptionStatus::Completed, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ReceptionError::InvalidTransition { .. }));

    c.service
        .change_status(reception_id, ReceptionStatus::InProgress, None)
        .await
        .unwrap();
    let err = c
        .service
        .change_status(reception_id, ReceptionStatus::Completed, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ReceptionError::InvalidTransition { .. }));

    c.pay(reception_id, dec!(300000)).await;
    let done = c
        .service
        .change_status(reception_id, ReceptionStatus::Completed, None)
        .await
        .unwrap();
    assert_eq!(done.status, ReceptionStatus::Completed);

    // Completed receptions are frozen
    let err = c
        .service
        .add_service(
            reception_id,
            AddServiceInput {
                service_id: c.visit.id,
                quantity: 1,
            },
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ReceptionError::Locked(_)));
    let err = c
        .service
        .change_status(reception_id, ReceptionStatus::Cancelled, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ReceptionError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_empty_reception_cannot_complete() {
    let c = clinic().await;
    let reception = c
        .service
        .create_reception(c.reception_input(), None)
        .await
        .unwrap();
    c.service
        .change_status(reception.id, ReceptionStatus::InProgress, None)
        .await
        .unwrap();
    let err = c
        .service
        .change_status(reception.id, ReceptionStatus::Completed, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ReceptionError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_cancel_needs_refund_first() {
    let c = clinic().await;
    let reception_id = c.reception_with_visit().await;
    c.pay(reception_id, dec!(300000)).await;

    let err = c
        .service
        .change_status(reception_id, ReceptionStatus::Cancelled, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ReceptionError::InvalidTransition { .. }));

    c.service
        .billing()
        .record_refund(
            reception_id,
            PaymentInput {
                amount: dec!(300000),
                method: PaymentMethod::Cash,
                reference_number: None,
                paid_at: None,
            },
            None,
        )
        .await
        .unwrap();
    let cancelled = c
        .service
        .change_status(reception_id, ReceptionStatus::Cancelled, None)
        .await
        .unwrap();
    assert_eq!(cancelled.status, ReceptionStatus::Cancelled);

    let err = c
        .service
        .billing()
        .record_payment(
            reception_id,
            PaymentInput {
                amount: dec!(1000),
                method: PaymentMethod::Cash,
                reference_number: None,
                paid_at: None,
            },
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, BillingError::PaymentRejected(_)));
}

#[tokio::test]
async fn test_recalculate_picks_up_new_tariff() {
    let c = clinic().await;
    let reception_id = c.reception_with_visit().await;

    c.service
        .insurance()
        .create_tariff(
            TariffInput {
                plan_id: c.plan_id,
                service_id: c.visit.id,
                total_price: dec!(1200000),
                insurer_share: None,
                effective_from: date(2024, 3, 20),
                effective_to: None,
            },
            None,
        )
        .await
        .unwrap();

    let details = c.service.recalculate(reception_id, None).await.unwrap();
    assert_eq!(details.lines.len(), 1);
    assert_eq!(details.lines[0].line.unit_price, dec!(1200000));
    let calculation = details.lines[0].calculation.as_ref().unwrap();
    assert_eq!(calculation.primary_share, dec!(840000));
    assert_eq!(calculation.patient_share, dec!(360000));
    assert_eq!(details.balance.patient_total, dec!(360000));
}

#[tokio::test]
async fn test_category_with_services_cannot_be_deleted() {
    let c = clinic().await;
    let err = c.service.delete_category(c.category.id, None).await.unwrap_err();
    assert!(matches!(err, ReceptionError::Conflict(_)));
}

#[tokio::test]
async fn test_patient_with_open_reception_cannot_be_deleted() {
    let c = clinic().await;
    c.reception_with_visit().await;
    let err = c.service.delete_patient(c.patient.id, None).await.unwrap_err();
    assert!(matches!(err, ReceptionError::Locked(_)));
}
