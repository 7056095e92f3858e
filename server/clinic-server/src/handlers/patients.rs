use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use database_layer::{Entity, Patient, PatientInsurance, Repo};
use insurance_service::PatientInsuranceInput;
use reception_service::PatientInput;
use tracing::info;
use uuid::Uuid;

use crate::error::{api_success, ApiError, ApiResponse};
use crate::handlers::common::{created, CrudHandler};
use crate::middleware::RequestContext;
use crate::server::ClinicServer;
use crate::types::{list_query, paginated, ListParams};

pub struct PatientHandler;

impl CrudHandler for PatientHandler {
    type Record = Patient;

    fn repository(server: &ClinicServer) -> &Repo<Patient> {
        &server.repos.patients
    }
}

/// List patients
///
/// Search covers name, national code, file number and mobile.
#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::PATIENTS,
    params(ListParams),
    responses(
        (status = 200, description = "Patients retrieved successfully", body = Vec<Patient>),
        (status = 400, description = "Invalid filter or sort field")
    ),
    tag = "patients"
)]
pub async fn list_patients(
    State(server): State<ClinicServer>,
    Query(raw): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<Vec<Patient>>>, ApiError> {
    PatientHandler::list(&server, &raw).await
}

#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::PATIENT_BY_ID,
    params(("id" = Uuid, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Patient retrieved successfully", body = Patient),
        (status = 404, description = "Patient not found")
    ),
    tag = "patients"
)]
pub async fn get_patient(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Patient>>, ApiError> {
    PatientHandler::get(&server, id).await
}

/// Register a patient; the file number is assigned here
#[utoipa::path(
    post,
    path = crate::routes::paths::api_v1::PATIENTS,
    request_body = PatientInput,
    responses(
        (status = 201, description = "Patient registered", body = Patient),
        (status = 400, description = "Invalid national code or mobile"),
        (status = 409, description = "National code already registered")
    ),
    tag = "patients"
)]
pub async fn create_patient(
    State(server): State<ClinicServer>,
    ctx: RequestContext,
    Json(input): Json<PatientInput>,
) -> Result<(StatusCode, Json<ApiResponse<Patient>>), ApiError> {
    let patient = server.reception.register_patient(input, ctx.actor).await?;
    info!(patient_id = %patient.id, request_id = %ctx.request_id, "Patient registered");
    Ok(created(patient))
}

#[utoipa::path(
    put,
    path = crate::routes::paths::api_v1::PATIENT_BY_ID,
    params(("id" = Uuid, Path, description = "Patient ID")),
    request_body = PatientInput,
    responses(
        (status = 200, description = "Patient updated", body = Patient),
        (status = 404, description = "Patient not found"),
        (status = 409, description = "National code already registered")
    ),
    tag = "patients"
)]
pub async fn update_patient(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
    Json(input): Json<PatientInput>,
) -> Result<Json<ApiResponse<Patient>>, ApiError> {
    let patient = server.reception.update_patient(id, input, ctx.actor).await?;
    Ok(Json(api_success(patient)))
}

/// Soft delete a patient with no open receptions
#[utoipa::path(
    delete,
    path = crate::routes::paths::api_v1::PATIENT_BY_ID,
    params(("id" = Uuid, Path, description = "Patient ID")),
    responses(
        (status = 204, description = "Patient deleted"),
        (status = 404, description = "Patient not found"),
        (status = 422, description = "Patient has open receptions")
    ),
    tag = "patients"
)]
pub async fn delete_patient(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> Result<StatusCode, ApiError> {
    server.reception.delete_patient(id, ctx.actor).await?;
    info!(patient_id = %id, request_id = %ctx.request_id, "Patient deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = crate::routes::paths::api_v1::PATIENT_RESTORE,
    params(("id" = Uuid, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Patient restored", body = Patient),
        (status = 404, description = "Patient not found"),
        (status = 409, description = "National code taken by a live patient")
    ),
    tag = "patients"
)]
pub async fn restore_patient(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> Result<Json<ApiResponse<Patient>>, ApiError> {
    let patient = server.reception.restore_patient(id, ctx.actor).await?;
    Ok(Json(api_success(patient)))
}

// ============================================================================
// PATIENT INSURANCES
// ============================================================================

/// Insurance records are addressed through their patient; a record that
/// belongs to someone else is reported as missing
async fn owned_insurance(
    server: &ClinicServer,
    patient_id: Uuid,
    insurance_id: Uuid,
) -> Result<PatientInsurance, ApiError> {
    let insurance = server
        .repos
        .patient_insurances
        .get_including_deleted(insurance_id)
        .await?;
    if insurance.patient_id != patient_id {
        return Err(ApiError::from(database_layer::DatabaseError::not_found(
            PatientInsurance::RESOURCE,
            insurance_id,
        )));
    }
    Ok(insurance)
}

#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::PATIENT_INSURANCES,
    params(("id" = Uuid, Path, description = "Patient ID"), ListParams),
    responses(
        (status = 200, description = "Patient insurances retrieved", body = Vec<PatientInsurance>),
        (status = 404, description = "Patient not found")
    ),
    tag = "patients"
)]
pub async fn list_patient_insurances(
    State(server): State<ClinicServer>,
    Path(patient_id): Path<Uuid>,
    Query(raw): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<Vec<PatientInsurance>>>, ApiError> {
    server.reception.patient(patient_id).await?;
    let query = list_query(&raw, &server.config.pagination)?
        .with_filter("patient_id", patient_id.to_string());
    let page = server.repos.patient_insurances.list(&query).await?;
    Ok(Json(paginated(page)))
}

#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::PATIENT_INSURANCE_BY_ID,
    params(
        ("id" = Uuid, Path, description = "Patient ID"),
        ("insurance_id" = Uuid, Path, description = "Patient insurance ID")
    ),
    responses(
        (status = 200, description = "Patient insurance retrieved", body = PatientInsurance),
        (status = 404, description = "Patient insurance not found")
    ),
    tag = "patients"
)]
pub async fn get_patient_insurance(
    State(server): State<ClinicServer>,
    Path((patient_id, insurance_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<PatientInsurance>>, ApiError> {
    let insurance = server
        .insurance()
        .patient_insurance(patient_id, insurance_id)
        .await?;
    Ok(Json(api_success(insurance)))
}

#[utoipa::path(
    post,
    path = crate::routes::paths::api_v1::PATIENT_INSURANCES,
    params(("id" = Uuid, Path, description = "Patient ID")),
    request_body = PatientInsuranceInput,
    responses(
        (status = 201, description = "Insurance added to patient", body = PatientInsurance),
        (status = 400, description = "Invalid validity window or priority"),
        (status = 404, description = "Patient or plan not found"),
        (status = 422, description = "Plan kind does not match the insurance kind")
    ),
    tag = "patients"
)]
pub async fn create_patient_insurance(
    State(server): State<ClinicServer>,
    Path(patient_id): Path<Uuid>,
    ctx: RequestContext,
    Json(input): Json<PatientInsuranceInput>,
) -> Result<(StatusCode, Json<ApiResponse<PatientInsurance>>), ApiError> {
    server.reception.patient(patient_id).await?;
    let insurance = server
        .insurance()
        .add_patient_insurance(patient_id, input, ctx.actor)
        .await?;
    Ok(created(insurance))
}

#[utoipa::path(
    put,
    path = crate::routes::paths::api_v1::PATIENT_INSURANCE_BY_ID,
    params(
        ("id" = Uuid, Path, description = "Patient ID"),
        ("insurance_id" = Uuid, Path, description = "Patient insurance ID")
    ),
    request_body = PatientInsuranceInput,
    responses(
        (status = 200, description = "Patient insurance updated", body = PatientInsurance),
        (status = 404, description = "Patient insurance not found")
    ),
    tag = "patients"
)]
pub async fn update_patient_insurance(
    State(server): State<ClinicServer>,
    Path((patient_id, insurance_id)): Path<(Uuid, Uuid)>,
    ctx: RequestContext,
    Json(input): Json<PatientInsuranceInput>,
) -> Result<Json<ApiResponse<PatientInsurance>>, ApiError> {
    let insurance = server
        .insurance()
        .update_patient_insurance(patient_id, insurance_id, input, ctx.actor)
        .await?;
    Ok(Json(api_success(insurance)))
}

#[utoipa::path(
    delete,
    path = crate::routes::paths::api_v1::PATIENT_INSURANCE_BY_ID,
    params(
        ("id" = Uuid, Path, description = "Patient ID"),
        ("insurance_id" = Uuid, Path, description = "Patient insurance ID")
    ),
    responses(
        (status = 204, description = "Patient insurance deleted"),
        (status = 404, description = "Patient insurance not found")
    ),
    tag = "patients"
)]
pub async fn delete_patient_insurance(
    State(server): State<ClinicServer>,
    Path((patient_id, insurance_id)): Path<(Uuid, Uuid)>,
    ctx: RequestContext,
) -> Result<StatusCode, ApiError> {
    owned_insurance(&server, patient_id, insurance_id).await?;
    server
        .repos
        .patient_insurances
        .soft_delete(insurance_id, ctx.actor)
        .await?;
    info!(%patient_id, %insurance_id, request_id = %ctx.request_id, "Patient insurance deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = crate::routes::paths::api_v1::PATIENT_INSURANCE_RESTORE,
    params(
        ("id" = Uuid, Path, description = "Patient ID"),
        ("insurance_id" = Uuid, Path, description = "Patient insurance ID")
    ),
    responses(
        (status = 200, description = "Patient insurance restored", body = PatientInsurance),
        (status = 404, description = "Patient insurance not found")
    ),
    tag = "patients"
)]
pub async fn restore_patient_insurance(
    State(server): State<ClinicServer>,
    Path((patient_id, insurance_id)): Path<(Uuid, Uuid)>,
    ctx: RequestContext,
) -> Result<Json<ApiResponse<PatientInsurance>>, ApiError> {
    owned_insurance(&server, patient_id, insurance_id).await?;
    let insurance = server
        .repos
        .patient_insurances
        .restore(insurance_id, ctx.actor)
        .await?;
    Ok(Json(api_success(insurance)))
}
