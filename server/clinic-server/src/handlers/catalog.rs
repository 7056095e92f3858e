//! Doctors, service categories and billable medical services

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use database_layer::{Doctor, MedicalService, Repo, ServiceCategory};
use reception_service::{DoctorInput, MedicalServiceInput, ServiceCategoryInput};
use tracing::info;
use uuid::Uuid;

use crate::error::{api_success, ApiError, ApiResponse};
use crate::handlers::common::{created, CrudHandler};
use crate::middleware::RequestContext;
use crate::server::ClinicServer;
use crate::types::ListParams;

pub struct DoctorHandler;

impl CrudHandler for DoctorHandler {
    type Record = Doctor;

    fn repository(server: &ClinicServer) -> &Repo<Doctor> {
        &server.repos.doctors
    }
}

pub struct CategoryHandler;

impl CrudHandler for CategoryHandler {
    type Record = ServiceCategory;

    fn repository(server: &ClinicServer) -> &Repo<ServiceCategory> {
        &server.repos.service_categories
    }
}

pub struct MedicalServiceHandler;

impl CrudHandler for MedicalServiceHandler {
    type Record = MedicalService;

    fn repository(server: &ClinicServer) -> &Repo<MedicalService> {
        &server.repos.medical_services
    }
}

// ============================================================================
// DOCTORS
// ============================================================================

#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::DOCTORS,
    params(ListParams),
    responses(
        (status = 200, description = "Doctors retrieved successfully", body = Vec<Doctor>),
        (status = 400, description = "Invalid filter or sort field")
    ),
    tag = "catalog"
)]
pub async fn list_doctors(
    State(server): State<ClinicServer>,
    Query(raw): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<Vec<Doctor>>>, ApiError> {
    DoctorHandler::list(&server, &raw).await
}

#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::DOCTOR_BY_ID,
    params(("id" = Uuid, Path, description = "Doctor ID")),
    responses(
        (status = 200, description = "Doctor retrieved successfully", body = Doctor),
        (status = 404, description = "Doctor not found")
    ),
    tag = "catalog"
)]
pub async fn get_doctor(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Doctor>>, ApiError> {
    DoctorHandler::get(&server, id).await
}

#[utoipa::path(
    post,
    path = crate::routes::paths::api_v1::DOCTORS,
    request_body = DoctorInput,
    responses(
        (status = 201, description = "Doctor created", body = Doctor),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Medical council code already registered")
    ),
    tag = "catalog"
)]
pub async fn create_doctor(
    State(server): State<ClinicServer>,
    ctx: RequestContext,
    Json(input): Json<DoctorInput>,
) -> Result<(StatusCode, Json<ApiResponse<Doctor>>), ApiError> {
    let doctor = server.reception.create_doctor(input, ctx.actor).await?;
    info!(doctor_id = %doctor.id, request_id = %ctx.request_id, "Doctor created");
    Ok(created(doctor))
}

#[utoipa::path(
    put,
    path = crate::routes::paths::api_v1::DOCTOR_BY_ID,
    params(("id" = Uuid, Path, description = "Doctor ID")),
    request_body = DoctorInput,
    responses(
        (status = 200, description = "Doctor updated", body = Doctor),
        (status = 404, description = "Doctor not found"),
        (status = 409, description = "Medical council code already registered")
    ),
    tag = "catalog"
)]
pub async fn update_doctor(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
    Json(input): Json<DoctorInput>,
) -> Result<Json<ApiResponse<Doctor>>, ApiError> {
    let doctor = server.reception.update_doctor(id, input, ctx.actor).await?;
    Ok(Json(api_success(doctor)))
}

#[utoipa::path(
    delete,
    path = crate::routes::paths::api_v1::DOCTOR_BY_ID,
    params(("id" = Uuid, Path, description = "Doctor ID")),
    responses(
        (status = 204, description = "Doctor deleted"),
        (status = 404, description = "Doctor not found")
    ),
    tag = "catalog"
)]
pub async fn delete_doctor(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> Result<StatusCode, ApiError> {
    DoctorHandler::delete(&server, id, &ctx).await
}

#[utoipa::path(
    post,
    path = crate::routes::paths::api_v1::DOCTOR_RESTORE,
    params(("id" = Uuid, Path, description = "Doctor ID")),
    responses(
        (status = 200, description = "Doctor restored", body = Doctor),
        (status = 404, description = "Doctor not found")
    ),
    tag = "catalog"
)]
pub async fn restore_doctor(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> Result<Json<ApiResponse<Doctor>>, ApiError> {
    DoctorHandler::restore(&server, id, &ctx).await
}

// ============================================================================
// SERVICE CATEGORIES
// ============================================================================

#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::CATEGORIES,
    params(ListParams),
    responses(
        (status = 200, description = "Service categories retrieved", body = Vec<ServiceCategory>)
    ),
    tag = "catalog"
)]
pub async fn list_categories(
    State(server): State<ClinicServer>,
    Query(raw): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<Vec<ServiceCategory>>>, ApiError> {
    CategoryHandler::list(&server, &raw).await
}

#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::CATEGORY_BY_ID,
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Service category retrieved", body = ServiceCategory),
        (status = 404, description = "Service category not found")
    ),
    tag = "catalog"
)]
pub async fn get_category(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ServiceCategory>>, ApiError> {
    CategoryHandler::get(&server, id).await
}

#[utoipa::path(
    post,
    path = crate::routes::paths::api_v1::CATEGORIES,
    request_body = ServiceCategoryInput,
    responses(
        (status = 201, description = "Service category created", body = ServiceCategory),
        (status = 409, description = "Category code already used")
    ),
    tag = "catalog"
)]
pub async fn create_category(
    State(server): State<ClinicServer>,
    ctx: RequestContext,
    Json(input): Json<ServiceCategoryInput>,
) -> Result<(StatusCode, Json<ApiResponse<ServiceCategory>>), ApiError> {
    let category = server.reception.create_category(input, ctx.actor).await?;
    Ok(created(category))
}

#[utoipa::path(
    put,
    path = crate::routes::paths::api_v1::CATEGORY_BY_ID,
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = ServiceCategoryInput,
    responses(
        (status = 200, description = "Service category updated", body = ServiceCategory),
        (status = 404, description = "Service category not found")
    ),
    tag = "catalog"
)]
pub async fn update_category(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
    Json(input): Json<ServiceCategoryInput>,
) -> Result<Json<ApiResponse<ServiceCategory>>, ApiError> {
    let category = server.reception.update_category(id, input, ctx.actor).await?;
    Ok(Json(api_success(category)))
}

/// Delete a category that no live medical service uses
#[utoipa::path(
    delete,
    path = crate::routes::paths::api_v1::CATEGORY_BY_ID,
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Service category deleted"),
        (status = 404, description = "Service category not found"),
        (status = 422, description = "Category still has services")
    ),
    tag = "catalog"
)]
pub async fn delete_category(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> Result<StatusCode, ApiError> {
    server.reception.delete_category(id, ctx.actor).await?;
    info!(category_id = %id, request_id = %ctx.request_id, "Service category deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = crate::routes::paths::api_v1::CATEGORY_RESTORE,
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Service category restored", body = ServiceCategory),
        (status = 404, description = "Service category not found")
    ),
    tag = "catalog"
)]
pub async fn restore_category(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> Result<Json<ApiResponse<ServiceCategory>>, ApiError> {
    CategoryHandler::restore(&server, id, &ctx).await
}

// ============================================================================
// MEDICAL SERVICES
// ============================================================================

#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::SERVICES,
    params(ListParams),
    responses(
        (status = 200, description = "Medical services retrieved", body = Vec<MedicalService>)
    ),
    tag = "catalog"
)]
pub async fn list_services(
    State(server): State<ClinicServer>,
    Query(raw): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<Vec<MedicalService>>>, ApiError> {
    MedicalServiceHandler::list(&server, &raw).await
}

#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::SERVICE_BY_ID,
    params(("id" = Uuid, Path, description = "Medical service ID")),
    responses(
        (status = 200, description = "Medical service retrieved", body = MedicalService),
        (status = 404, description = "Medical service not found")
    ),
    tag = "catalog"
)]
pub async fn get_service(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MedicalService>>, ApiError> {
    MedicalServiceHandler::get(&server, id).await
}

#[utoipa::path(
    post,
    path = crate::routes::paths::api_v1::SERVICES,
    request_body = MedicalServiceInput,
    responses(
        (status = 201, description = "Medical service created", body = MedicalService),
        (status = 400, description = "Negative price"),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Service code already used")
    ),
    tag = "catalog"
)]
pub async fn create_service(
    State(server): State<ClinicServer>,
    ctx: RequestContext,
    Json(input): Json<MedicalServiceInput>,
) -> Result<(StatusCode, Json<ApiResponse<MedicalService>>), ApiError> {
    let service = server
        .reception
        .create_medical_service(input, ctx.actor)
        .await?;
    Ok(created(service))
}

#[utoipa::path(
    put,
    path = crate::routes::paths::api_v1::SERVICE_BY_ID,
    params(("id" = Uuid, Path, description = "Medical service ID")),
    request_body = MedicalServiceInput,
    responses(
        (status = 200, description = "Medical service updated", body = MedicalService),
        (status = 404, description = "Medical service not found")
    ),
    tag = "catalog"
)]
pub async fn update_service(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
    Json(input): Json<MedicalServiceInput>,
) -> Result<Json<ApiResponse<MedicalService>>, ApiError> {
    let service = server
        .reception
        .update_medical_service(id, input, ctx.actor)
        .await?;
    Ok(Json(api_success(service)))
}

#[utoipa::path(
    delete,
    path = crate::routes::paths::api_v1::SERVICE_BY_ID,
    params(("id" = Uuid, Path, description = "Medical service ID")),
    responses(
        (status = 204, description = "Medical service deleted"),
        (status = 404, description = "Medical service not found")
    ),
    tag = "catalog"
)]
pub async fn delete_service(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> Result<StatusCode, ApiError> {
    MedicalServiceHandler::delete(&server, id, &ctx).await
}

#[utoipa::path(
    post,
    path = crate::routes::paths::api_v1::SERVICE_RESTORE,
    params(("id" = Uuid, Path, description = "Medical service ID")),
    responses(
        (status = 200, description = "Medical service restored", body = MedicalService),
        (status = 404, description = "Medical service not found")
    ),
    tag = "catalog"
)]
pub async fn restore_service(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> Result<Json<ApiResponse<MedicalService>>, ApiError> {
    MedicalServiceHandler::restore(&server, id, &ctx).await
}
