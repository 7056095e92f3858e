use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use billing_service::{Balance, PaymentInput};
use database_layer::Payment;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ApiError, ApiResponse, api_success};
use crate::handlers::common::created;
use crate::middleware::RequestContext;
use crate::server::ClinicServer;
use crate::view_models::PaymentReceiptViewModel;

/// Payments and refunds of one reception with its running balance
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReceptionPayments {
    pub payments: Vec<Payment>,
    pub balance: Balance,
}

#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::RECEPTION_PAYMENTS,
    params(("id" = Uuid, Path, description = "Reception ID")),
    responses(
        (status = 200, description = "Payments in the order they were made", body = ReceptionPayments),
        (status = 404, description = "Reception not found")
    ),
    tag = "payments"
)]
pub async fn list_payments(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ReceptionPayments>>, ApiError> {
    server.reception.reception(id).await?;
    let payments = server.billing().payments(id).await?;
    let balance = server.billing().balance(id).await?;
    Ok(Json(api_success(ReceptionPayments { payments, balance })))
}

/// Take a payment; more than the outstanding balance is rejected
#[utoipa::path(
    post,
    path = crate::routes::paths::api_v1::RECEPTION_PAYMENTS,
    params(("id" = Uuid, Path, description = "Reception ID")),
    request_body = PaymentInput,
    responses(
        (status = 201, description = "Payment recorded", body = Payment),
        (status = 400, description = "Amount not positive"),
        (status = 404, description = "Reception not found"),
        (status = 422, description = "Overpayment or cancelled reception")
    ),
    tag = "payments"
)]
pub async fn record_payment(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
    Json(input): Json<PaymentInput>,
) -> Result<(StatusCode, Json<ApiResponse<Payment>>), ApiError> {
    let payment = server.billing().record_payment(id, input, ctx.actor).await?;
    info!(
        reception_id = %id,
        receipt = %payment.receipt_number,
        method = %payment.method,
        request_id = %ctx.request_id,
        "Payment recorded"
    );
    Ok(created(payment))
}

#[utoipa::path(
    post,
    path = crate::routes::paths::api_v1::RECEPTION_REFUNDS,
    params(("id" = Uuid, Path, description = "Reception ID")),
    request_body = PaymentInput,
    responses(
        (status = 201, description = "Refund recorded", body = Payment),
        (status = 400, description = "Amount not positive"),
        (status = 404, description = "Reception not found"),
        (status = 422, description = "Refund exceeds the net amount paid")
    ),
    tag = "payments"
)]
pub async fn record_refund(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
    Json(input): Json<PaymentInput>,
) -> Result<(StatusCode, Json<ApiResponse<Payment>>), ApiError> {
    let refund = server.billing().record_refund(id, input, ctx.actor).await?;
    info!(
        reception_id = %id,
        receipt = %refund.receipt_number,
        request_id = %ctx.request_id,
        "Refund recorded"
    );
    Ok(created(refund))
}

/// Printable receipt for a payment or refund
#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::PAYMENT_RECEIPT,
    params(("id" = Uuid, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Receipt", body = PaymentReceiptViewModel),
        (status = 404, description = "Payment not found")
    ),
    tag = "payments"
)]
pub async fn payment_receipt(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PaymentReceiptViewModel>>, ApiError> {
    let payment = server.repos.payments.get(id).await?;
    let details = server
        .reception
        .reception_details(payment.reception_id)
        .await?;
    let receipt = PaymentReceiptViewModel::build(&payment, &details, &server.config.clinic);
    Ok(Json(api_success(receipt)))
}
