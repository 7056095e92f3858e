use billing_service::{BillingError, BillingService, PaymentInput};
use chrono::{NaiveDate, TimeZone, Utc};
use database_layer::{
    AuditInfo, InsuranceCalculation, PaymentKind, PaymentMethod, Reception, ReceptionStatus,
    Repositories, Repository,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

struct Fixture {
    repos: Repositories,
    billing: BillingService,
    reception: Reception,
}

/// A reception whose patient owes `patient_share` over two lines
async fn fixture(patient_share: Decimal, status: ReceptionStatus) -> Fixture {
    let repos = Repositories::in_memory();
    let reception = repos
        .receptions
        .insert(
            Reception {
                id: Uuid::new_v4(),
                patient_id: Uuid::new_v4(),
                doctor_id: Uuid::new_v4(),
                reception_number: "140301150007".to_string(),
                reception_day: NaiveDate::from_ymd_opt(2024, 6, 4).unwrap(),
                received_at: Utc.with_ymd_and_hms(2024, 6, 4, 6, 30, 0).unwrap(),
                status,
                primary_insurance_id: None,
                supplementary_insurance_id: None,
                notes: None,
                audit: AuditInfo::default(),
            },
            None,
        )
        .await
        .unwrap();

    let half = patient_share / dec!(2);
    for share in [half, patient_share - half] {
        repos
            .insurance_calculations
            .insert(
                InsuranceCalculation {
                    id: Uuid::new_v4(),
                    reception_id: reception.id,
                    reception_service_id: Uuid::new_v4(),
                    primary_plan_id: None,
                    supplementary_plan_id: None,
                    base_amount: share,
                    primary_share: Decimal::ZERO,
                    supplementary_share: Decimal::ZERO,
                    patient_share: share,
                    deductible_amount: Decimal::ZERO,
                    calculated_at: Utc::now(),
                    audit: AuditInfo::default(),
                },
                None,
            )
            .await
            .unwrap();
    }

    Fixture {
        billing: BillingService::new(repos.clone()),
        repos,
        reception,
    }
}

fn cash(amount: Decimal) -> PaymentInput {
    PaymentInput {
        amount,
        method: PaymentMethod::Cash,
        reference_number: None,
        paid_at: None,
    }
}

#[tokio::test]
async fn test_balance_of_unpaid_reception() {
    let f = fixture(dec!(700000), ReceptionStatus::Registered).await;
    let balance = f.billing.balance(f.reception.id).await.unwrap();
    assert_eq!(balance.patient_total, dec!(700000));
    assert_eq!(balance.paid, Decimal::ZERO);
    assert_eq!(balance.outstanding, dec!(700000));
    assert!(!balance.is_settled());
}

#[tokio::test]
async fn test_payments_get_sequential_receipts_and_settle() {
    let f = fixture(dec!(700000), ReceptionStatus::Registered).await;
    let actor = Some(Uuid::new_v4());

    let first = f
        .billing
        .record_payment(f.reception.id, cash(dec!(500000)), actor)
        .await
        .unwrap();
    assert_eq!(first.receipt_number, "140301150007-01");
    assert_eq!(first.kind, PaymentKind::Payment);
    assert_eq!(first.audit.created_by, actor);

    let second = f
        .billing
        .record_payment(
            f.reception.id,
            PaymentInput {
                amount: dec!(200000),
                method: PaymentMethod::Card,
                reference_number: Some("  778812 ".to_string()),
                paid_at: None,
            },
            actor,
        )
        .await
        .unwrap();
    assert_eq!(second.receipt_number, "140301150007-02");
    assert_eq!(second.reference_number.as_deref(), Some("778812"));

    let balance = f.billing.balance(f.reception.id).await.unwrap();
    assert_eq!(balance.net_paid, dec!(700000));
    assert!(balance.is_settled());
    assert_eq!(f.billing.payments(f.reception.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_overpayment_is_rejected() {
    let f = fixture(dec!(300000), ReceptionStatus::Registered).await;
    let err = f
        .billing
        .record_payment(f.reception.id, cash(dec!(300001)), None)
        .await
        .unwrap_err();
    assert!(matches!(err, BillingError::PaymentRejected(_)));
    assert_eq!(err.code(), error_common::codes::business::PAYMENT_REJECTED);
}

#[tokio::test]
async fn test_amount_must_be_positive_whole_rials() {
    let f = fixture(dec!(300000), ReceptionStatus::Registered).await;
    for amount in [Decimal::ZERO, dec!(-10), dec!(10.5)] {
        let err = f
            .billing
            .record_payment(f.reception.id, cash(amount), None)
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::Validation(_)), "{amount}");
    }
}

#[tokio::test]
async fn test_cancelled_reception_takes_no_payment() {
    let f = fixture(dec!(300000), ReceptionStatus::Cancelled).await;
    let err = f
        .billing
        .record_payment(f.reception.id, cash(dec!(1000)), None)
        .await
        .unwrap_err();
    assert!(matches!(err, BillingError::PaymentRejected(_)));
}

#[tokio::test]
async fn test_refund_limited_to_net_paid() {
    let f = fixture(dec!(500000), ReceptionStatus::Registered).await;
    f.billing
        .record_payment(f.reception.id, cash(dec!(400000)), None)
        .await
        .unwrap();

    let err = f
        .billing
        .record_refund(f.reception.id, cash(dec!(400001)), None)
        .await
        .unwrap_err();
    assert!(matches!(err, BillingError::PaymentRejected(_)));

    let refund = f
        .billing
        .record_refund(f.reception.id, cash(dec!(150000)), None)
        .await
        .unwrap();
    assert_eq!(refund.kind, PaymentKind::Refund);
    assert_eq!(refund.receipt_number, "140301150007-02");

    let balance = f.billing.balance(f.reception.id).await.unwrap();
    assert_eq!(balance.paid, dec!(400000));
    assert_eq!(balance.refunded, dec!(150000));
    assert_eq!(balance.net_paid, dec!(250000));
    assert_eq!(balance.outstanding, dec!(250000));
}

#[tokio::test]
async fn test_deleted_calculations_leave_the_balance() {
    let f = fixture(dec!(600000), ReceptionStatus::Registered).await;
    let calculations = f.billing.calculations(f.reception.id).await.unwrap();
    f.repos
        .insurance_calculations
        .soft_delete(calculations[0].id, None)
        .await
        .unwrap();

    let balance = f.billing.balance(f.reception.id).await.unwrap();
    assert_eq!(balance.patient_total, dec!(300000));
}

#[tokio::test]
async fn test_unknown_reception_is_not_found() {
    let f = fixture(dec!(1000), ReceptionStatus::Registered).await;
    let err = f
        .billing
        .record_payment(Uuid::new_v4(), cash(dec!(1000)), None)
        .await
        .unwrap_err();
    assert!(matches!(err, BillingError::Database(ref e) if e.is_not_found()));
}
