use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use database_layer::{Reception, ReceptionService as ServiceLine};
use reception_service::{
    AddServiceInput, ReceptionDetails, ReceptionInput, ReceptionLine, StatusChange,
};
use tracing::info;
use uuid::Uuid;

use crate::error::{api_success, ApiError, ApiResponse};
use crate::handlers::common::created;
use crate::middleware::RequestContext;
use crate::server::ClinicServer;
use crate::types::{list_query, paginated, ListParams};
use crate::view_models::{CombinedInsuranceCalculationViewModel, ReceptionFormViewModel};

/// List receptions
///
/// Filters: `patient_id`, `doctor_id`, `status`, `reception_day`
/// (`YYYY-MM-DD`), `reception_number`.
#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::RECEPTIONS,
    params(ListParams),
    responses(
        (status = 200, description = "Receptions retrieved successfully", body = Vec<Reception>),
        (status = 400, description = "Invalid filter or sort field")
    ),
    tag = "receptions"
)]
pub async fn list_receptions(
    State(server): State<ClinicServer>,
    Query(raw): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<Vec<Reception>>>, ApiError> {
    let query = list_query(&raw, &server.config.pagination)?;
    let page = server.reception.receptions(&query).await?;
    Ok(Json(paginated(page)))
}

/// Reception with its patient, doctor, lines, calculations and payments
#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::RECEPTION_BY_ID,
    params(("id" = Uuid, Path, description = "Reception ID")),
    responses(
        (status = 200, description = "Reception retrieved", body = ReceptionDetails),
        (status = 404, description = "Reception not found")
    ),
    tag = "receptions"
)]
pub async fn get_reception(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ReceptionDetails>>, ApiError> {
    let details = server.reception.reception_details(id).await?;
    Ok(Json(api_success(details)))
}

#[utoipa::path(
    post,
    path = crate::routes::paths::api_v1::RECEPTIONS,
    request_body = ReceptionInput,
    responses(
        (status = 201, description = "Reception registered", body = Reception),
        (status = 404, description = "Patient, doctor or insurance not found"),
        (status = 422, description = "Doctor inactive or insurance not valid on the visit day")
    ),
    tag = "receptions"
)]
pub async fn create_reception(
    State(server): State<ClinicServer>,
    ctx: RequestContext,
    Json(input): Json<ReceptionInput>,
) -> Result<(StatusCode, Json<ApiResponse<Reception>>), ApiError> {
    let reception = server.reception.create_reception(input, ctx.actor).await?;
    info!(
        reception_id = %reception.id,
        number = %reception.reception_number,
        request_id = %ctx.request_id,
        "Reception registered"
    );
    Ok(created(reception))
}

/// Add a priced service line; its insurance calculation is stored with it
#[utoipa::path(
    post,
    path = crate::routes::paths::api_v1::RECEPTION_SERVICES,
    params(("id" = Uuid, Path, description = "Reception ID")),
    request_body = AddServiceInput,
    responses(
        (status = 201, description = "Service added", body = ReceptionLine),
        (status = 404, description = "Reception or service not found"),
        (status = 422, description = "Reception closed or service inactive")
    ),
    tag = "receptions"
)]
pub async fn add_service(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
    Json(input): Json<AddServiceInput>,
) -> Result<(StatusCode, Json<ApiResponse<ReceptionLine>>), ApiError> {
    let line = server.reception.add_service(id, input, ctx.actor).await?;
    Ok(created(line))
}

#[utoipa::path(
    delete,
    path = crate::routes::paths::api_v1::RECEPTION_SERVICE_BY_ID,
    params(
        ("id" = Uuid, Path, description = "Reception ID"),
        ("line_id" = Uuid, Path, description = "Service line ID")
    ),
    responses(
        (status = 200, description = "Service line removed", body = ServiceLine),
        (status = 404, description = "Reception or line not found"),
        (status = 422, description = "Reception closed or already paid")
    ),
    tag = "receptions"
)]
pub async fn remove_service(
    State(server): State<ClinicServer>,
    Path((id, line_id)): Path<(Uuid, Uuid)>,
    ctx: RequestContext,
) -> Result<Json<ApiResponse<ServiceLine>>, ApiError> {
    let line = server
        .reception
        .remove_service(id, line_id, ctx.actor)
        .await?;
    Ok(Json(api_success(line)))
}

/// Re-price every live line against today's tariffs and plans
#[utoipa::path(
    post,
    path = crate::routes::paths::api_v1::RECEPTION_RECALCULATE,
    params(("id" = Uuid, Path, description = "Reception ID")),
    responses(
        (status = 200, description = "Reception recalculated", body = ReceptionDetails),
        (status = 404, description = "Reception not found"),
        (status = 422, description = "Reception closed")
    ),
    tag = "receptions"
)]
pub async fn recalculate(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> Result<Json<ApiResponse<ReceptionDetails>>, ApiError> {
    let details = server.reception.recalculate(id, ctx.actor).await?;
    Ok(Json(api_success(details)))
}

#[utoipa::path(
    put,
    path = crate::routes::paths::api_v1::RECEPTION_STATUS,
    params(("id" = Uuid, Path, description = "Reception ID")),
    request_body = StatusChange,
    responses(
        (status = 200, description = "Status changed", body = Reception),
        (status = 404, description = "Reception not found"),
        (status = 422, description = "Transition not allowed")
    ),
    tag = "receptions"
)]
pub async fn change_status(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
    Json(change): Json<StatusChange>,
) -> Result<Json<ApiResponse<Reception>>, ApiError> {
    let reception = server
        .reception
        .change_status(id, change.status, ctx.actor)
        .await?;
    Ok(Json(api_success(reception)))
}

/// Accordion form view of a reception
#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::RECEPTION_FORM,
    params(("id" = Uuid, Path, description = "Reception ID")),
    responses(
        (status = 200, description = "Reception form", body = ReceptionFormViewModel),
        (status = 404, description = "Reception not found")
    ),
    tag = "receptions"
)]
pub async fn reception_form(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ReceptionFormViewModel>>, ApiError> {
    let details = server.reception.reception_details(id).await?;
    let form = ReceptionFormViewModel::build(&details, server.config.clinic.currency_display);
    Ok(Json(api_success(form)))
}

#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::RECEPTION_INSURANCE_CALCULATION,
    params(("id" = Uuid, Path, description = "Reception ID")),
    responses(
        (status = 200, description = "Insurance calculation", body = CombinedInsuranceCalculationViewModel),
        (status = 404, description = "Reception not found")
    ),
    tag = "receptions"
)]
pub async fn insurance_calculation(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CombinedInsuranceCalculationViewModel>>, ApiError> {
    let details = server.reception.reception_details(id).await?;
    let view = CombinedInsuranceCalculationViewModel::from_details(
        &details,
        server.config.clinic.currency_display,
    );
    Ok(Json(api_success(view)))
}
