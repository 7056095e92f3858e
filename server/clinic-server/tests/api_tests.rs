//! HTTP tests against the in-memory backend

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use clinic_server::{create_app, ClinicServer};
use config_engine::ClinicConfig;

fn app() -> Router {
    create_app(ClinicServer::in_memory(ClinicConfig::in_memory()))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    actor: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(actor) = actor {
        builder = builder.header("x-user-id", actor);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None, None).await
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body), None).await
}

fn id_of(body: &Value) -> String {
    body["data"]["id"].as_str().unwrap().to_string()
}

fn patient_body(national_code: &str) -> Value {
    json!({
        "first_name": "سارا",
        "last_name": "احمدی",
        "national_code": national_code,
        "gender": "female",
        "mobile": "09121234567"
    })
}

fn doctor_body(code: &str) -> Value {
    json!({
        "first_name": "حمید",
        "last_name": "نوری",
        "medical_council_code": code,
        "specialty": "پزشک عمومی"
    })
}

struct Seeded {
    patient_id: String,
    doctor_id: String,
    service_id: String,
}

/// A patient with a 70% primary plan, a doctor and a visit priced 1,000,000 Rials
async fn seed(app: &Router) -> Seeded {
    let (status, patient) = post(app, "/api/v1/patients", patient_body("0499370899")).await;
    assert_eq!(status, StatusCode::CREATED);
    let patient_id = id_of(&patient);

    let (_, doctor) = post(app, "/api/v1/doctors", doctor_body("M-12345")).await;
    let doctor_id = id_of(&doctor);

    let (_, category) = post(
        app,
        "/api/v1/service-categories",
        json!({ "code": "visit", "name": "ویزیت" }),
    )
    .await;
    let category_id = id_of(&category);

    let (status, service) = post(
        app,
        "/api/v1/services",
        json!({
            "category_id": category_id,
            "code": "v-gp",
            "name": "ویزیت پزشک عمومی",
            "base_price": "1000000"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let service_id = id_of(&service);

    let (_, provider) = post(
        app,
        "/api/v1/insurance/providers",
        json!({ "code": "TAMIN", "name": "تامین اجتماعی", "kind": "primary" }),
    )
    .await;
    let (status, plan) = post(
        app,
        "/api/v1/insurance/plans",
        json!({
            "provider_id": id_of(&provider),
            "name": "Standard",
            "tier": "standard",
            "default_coverage_percent": "70",
            "effective_from": "2024-01-01"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let plan_id = id_of(&plan);

    let (status, _) = post(
        app,
        "/api/v1/insurance/plan-services",
        json!({ "plan_id": plan_id, "category_id": category_id }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = post(
        app,
        &format!("/api/v1/patients/{patient_id}/insurances"),
        json!({
            "plan_id": plan_id,
            "policy_number": "TM-55",
            "kind": "primary",
            "valid_from": "2024-01-01"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    Seeded {
        patient_id,
        doctor_id,
        service_id,
    }
}

#[tokio::test]
async fn test_health_check() {
    let app = app();
    for uri in ["/health", "/api/v1/health"] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "healthy");
        assert_eq!(body["data"]["checks"]["database"], "in-memory");
    }

    let (status, body) = get(&app, "/version").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["storage"], "memory");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = app();
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-7")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-7");
}

#[tokio::test]
async fn test_patient_registration() {
    let app = app();
    let (status, body) = post(&app, "/api/v1/patients", patient_body("۰۴۹۹۳۷۰۸۹۹")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["national_code"], "0499370899");
    assert_eq!(body["data"]["file_number"], "000001");

    let (status, body) = post(&app, "/api/v1/patients", patient_body("0499370899")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error_type"], "conflict");
}

#[tokio::test]
async fn test_invalid_national_code_rejected() {
    let app = app();
    let (status, body) = post(&app, "/api/v1/patients", patient_body("1234567890")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "validation_error");
    assert!(body["error_id"].is_string());
}

#[tokio::test]
async fn test_list_pagination_metadata() {
    let app = app();
    for code in ["M-1", "M-2", "M-3"] {
        let (status, _) = post(&app, "/api/v1/doctors", doctor_body(code)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = get(&app, "/api/v1/doctors?page=1&page_size=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["metadata"]["total_count"], 3);
    assert_eq!(body["metadata"]["pagination"]["total_pages"], 2);
    assert_eq!(body["metadata"]["pagination"]["has_next"], true);
    assert_eq!(body["metadata"]["pagination"]["has_previous"], false);

    let (_, body) = get(&app, "/api/v1/doctors?medical_council_code=M-2").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _) = get(&app, "/api/v1/doctors?sort_by=salary").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_actor_is_stamped_and_validated() {
    let app = app();
    let actor = Uuid::new_v4().to_string();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/doctors",
        Some(doctor_body("M-9")),
        Some(&actor),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["created_by"], actor.as_str());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/doctors",
        Some(doctor_body("M-10")),
        Some("front-desk"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["x-user-id"].is_array());
}

#[tokio::test]
async fn test_soft_delete_and_restore() {
    let app = app();
    let (_, doctor) = post(&app, "/api/v1/doctors", doctor_body("M-77")).await;
    let id = id_of(&doctor);
    let uri = format!("/api/v1/doctors/{id}");

    let (status, body) = send(&app, Method::DELETE, &uri, None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = get(&app, &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = get(&app, "/api/v1/doctors").await;
    assert_eq!(body["metadata"]["total_count"], 0);
    let (_, body) = get(&app, "/api/v1/doctors?include_deleted=true").await;
    assert_eq!(body["metadata"]["total_count"], 1);

    let (status, body) = send(&app, Method::POST, &format!("{uri}/restore"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_deleted"], false);

    let (status, _) = get(&app, &uri).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_records_return_not_found() {
    let app = app();
    let missing = Uuid::new_v4();
    for uri in [
        format!("/api/v1/patients/{missing}"),
        format!("/api/v1/receptions/{missing}"),
        format!("/api/v1/receptions/{missing}/form"),
        format!("/api/v1/receptions/{missing}/payments"),
        format!("/api/v1/payments/{missing}/receipt"),
    ] {
        let (status, body) = get(&app, &uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body["error_type"], "not_found");
    }
}

#[tokio::test]
async fn test_coverage_calculation_preview() {
    let app = app();
    let seeded = seed(&app).await;

    let (status, body) = post(
        &app,
        "/api/v1/insurance/calculate",
        json!({
            "patient_id": seeded.patient_id,
            "service_id": seeded.service_id,
            "quantity": 2,
            "date": "2024-04-03"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let view = &body["data"];
    assert_eq!(view["has_insurance"], true);
    assert_eq!(view["rows"][0]["formatted_quantity"], "۲");
    assert_eq!(view["formatted_total_base"], "۲٬۰۰۰٬۰۰۰ ریال");
    assert_eq!(view["formatted_total_insurer"], "۱٬۴۰۰٬۰۰۰ ریال");
    assert_eq!(view["formatted_total_patient"], "۶۰۰٬۰۰۰ ریال");
    assert_eq!(view["primary"]["formatted_percent"], "۷۰٪");

    let (status, _) = post(
        &app,
        "/api/v1/insurance/calculate",
        json!({ "patient_id": seeded.patient_id, "service_id": seeded.service_id, "quantity": 0 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reception_flow() {
    let app = app();
    let seeded = seed(&app).await;

    let (status, reception) = post(
        &app,
        "/api/v1/receptions",
        json!({
            "patient_id": seeded.patient_id,
            "doctor_id": seeded.doctor_id,
            "received_at": "2024-04-03T06:00:00Z"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(reception["data"]["reception_number"], "140301150001");
    assert_eq!(reception["data"]["status"], "registered");
    let reception_id = id_of(&reception);
    let base = format!("/api/v1/receptions/{reception_id}");

    // Nothing to pay yet
    let (_, form) = get(&app, &format!("{base}/form")).await;
    assert_eq!(form["data"]["sections"].as_array().unwrap().len(), 4);
    assert_eq!(form["data"]["status_label"], "پذیرش شده");
    assert_eq!(form["data"]["received_at_display"], "۱۴۰۳/۰۱/۱۵ - ۰۹:۳۰");
    assert_eq!(form["data"]["can_receive_payment"], false);

    let (status, line) = post(
        &app,
        &format!("{base}/services"),
        json!({ "service_id": seeded.service_id }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(line["data"]["line"]["quantity"], 1);
    assert!(line["data"]["calculation"].is_object());

    let (status, calc) = get(&app, &format!("{base}/insurance-calculation")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(calc["data"]["rows"].as_array().unwrap().len(), 1);
    assert_eq!(calc["data"]["primary"]["insurer_name"], "تامین اجتماعی");
    assert_eq!(calc["data"]["formatted_total_patient"], "۳۰۰٬۰۰۰ ریال");

    let (status, body) = post(
        &app,
        &format!("{base}/payments"),
        json!({ "amount": "500000", "method": "cash", "paid_at": "2024-04-03T06:10:00Z" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error_type"], "unprocessable_entity");

    let (status, payment) = post(
        &app,
        &format!("{base}/payments"),
        json!({ "amount": "100000", "method": "pos", "paid_at": "2024-04-03T06:10:00Z" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(payment["data"]["receipt_number"], "140301150001-01");
    let payment_id = id_of(&payment);

    let (_, form) = get(&app, &format!("{base}/form")).await;
    assert_eq!(form["data"]["formatted_paid"], "۱۰۰٬۰۰۰ ریال");
    assert_eq!(form["data"]["formatted_outstanding"], "۲۰۰٬۰۰۰ ریال");
    assert_eq!(form["data"]["can_receive_payment"], true);

    let (status, receipt) = get(&app, &format!("/api/v1/payments/{payment_id}/receipt")).await;
    assert_eq!(status, StatusCode::OK);
    let receipt = &receipt["data"];
    assert_eq!(receipt["title"], "رسید پرداخت");
    assert_eq!(receipt["formatted_receipt_number"], "۱۴۰۳۰۱۱۵۰۰۰۱-۰۱");
    assert_eq!(receipt["clinic_name"], "درمانگاه");
    assert_eq!(receipt["date_display"], "۱۴۰۳/۰۱/۱۵");
    assert_eq!(receipt["method_label"], "کارتخوان");
    assert_eq!(receipt["amount_figures"], "۱۰۰٬۰۰۰");
    assert_eq!(receipt["formatted_remaining"], "۲۰۰٬۰۰۰ ریال");

    // Completing with money outstanding is refused
    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("{base}/status"),
        Some(json!({ "status": "in_progress" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("{base}/status"),
        Some(json!({ "status": "completed" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = post(
        &app,
        &format!("{base}/payments"),
        json!({ "amount": "200000", "method": "transfer", "reference_number": "TRX-1" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, payments) = get(&app, &format!("{base}/payments")).await;
    assert_eq!(payments["data"]["payments"].as_array().unwrap().len(), 2);
    assert_eq!(payments["data"]["payments"][1]["receipt_number"], "140301150001-02");

    let (status, completed) = send(
        &app,
        Method::PUT,
        &format!("{base}/status"),
        Some(json!({ "status": "completed" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["data"]["status"], "completed");

    let (_, form) = get(&app, &format!("{base}/form")).await;
    assert_eq!(form["data"]["status_label"], "تکمیل شده");
    assert_eq!(form["data"]["can_edit_services"], false);
    assert!(form["data"]["sections"]
        .as_array()
        .unwrap()
        .iter()
        .all(|section| section["is_complete"] == true));

    let (_, listed) = get(&app, &format!("/api/v1/receptions?patient_id={}", seeded.patient_id)).await;
    assert_eq!(listed["metadata"]["total_count"], 1);
}

#[tokio::test]
async fn test_refund_receipt() {
    let app = app();
    let seeded = seed(&app).await;

    let (_, reception) = post(
        &app,
        "/api/v1/receptions",
        json!({
            "patient_id": seeded.patient_id,
            "doctor_id": seeded.doctor_id,
            "received_at": "2024-04-03T06:00:00Z"
        }),
    )
    .await;
    let base = format!("/api/v1/receptions/{}", id_of(&reception));
    post(&app, &format!("{base}/services"), json!({ "service_id": seeded.service_id })).await;
    post(
        &app,
        &format!("{base}/payments"),
        json!({ "amount": "300000", "method": "pos", "paid_at": "2024-04-03T06:10:00Z" }),
    )
    .await;

    let (status, _) = post(
        &app,
        &format!("{base}/refunds"),
        json!({ "amount": "400000", "method": "cash" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, refund) = post(
        &app,
        &format!("{base}/refunds"),
        json!({ "amount": "50000", "method": "cash", "paid_at": "2024-04-03T07:00:00Z" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(refund["data"]["kind"], "refund");

    let (_, receipt) = get(&app, &format!("/api/v1/payments/{}/receipt", id_of(&refund))).await;
    assert_eq!(receipt["data"]["title"], "رسید استرداد");
    assert_eq!(receipt["data"]["is_refund"], true);
    assert_eq!(receipt["data"]["formatted_total_paid"], "۲۵۰٬۰۰۰ ریال");
    assert_eq!(receipt["data"]["formatted_remaining"], "۵۰٬۰۰۰ ریال");
}
