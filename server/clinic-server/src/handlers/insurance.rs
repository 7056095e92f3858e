//! Insurers, plans, per-category plan rules, tariffs and the coverage preview

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use database_layer::{InsurancePlan, InsuranceProvider, InsuranceTariff, PlanService, Repo};
use insurance_service::{PlanInput, PlanServiceInput, ProviderInput, TariffInput};
use reception_service::clinic_day;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{api_success, ApiError, ApiResponse};
use crate::handlers::common::{created, CrudHandler};
use crate::middleware::RequestContext;
use crate::server::ClinicServer;
use crate::types::ListParams;
use crate::validation::RequestValidation;
use crate::view_models::CombinedInsuranceCalculationViewModel;
use crate::{validate_range, validate_uuid};

pub struct ProviderHandler;

impl CrudHandler for ProviderHandler {
    type Record = InsuranceProvider;

    fn repository(server: &ClinicServer) -> &Repo<InsuranceProvider> {
        &server.repos.insurance_providers
    }
}

pub struct PlanHandler;

impl CrudHandler for PlanHandler {
    type Record = InsurancePlan;

    fn repository(server: &ClinicServer) -> &Repo<InsurancePlan> {
        &server.repos.insurance_plans
    }
}

pub struct PlanServiceHandler;

impl CrudHandler for PlanServiceHandler {
    type Record = PlanService;

    fn repository(server: &ClinicServer) -> &Repo<PlanService> {
        &server.repos.plan_services
    }
}

pub struct TariffHandler;

impl CrudHandler for TariffHandler {
    type Record = InsuranceTariff;

    fn repository(server: &ClinicServer) -> &Repo<InsuranceTariff> {
        &server.repos.insurance_tariffs
    }
}

// ============================================================================
// PROVIDERS
// ============================================================================

#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::PROVIDERS,
    params(ListParams),
    responses(
        (status = 200, description = "Insurance providers retrieved", body = Vec<InsuranceProvider>)
    ),
    tag = "insurance"
)]
pub async fn list_providers(
    State(server): State<ClinicServer>,
    Query(raw): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<Vec<InsuranceProvider>>>, ApiError> {
    ProviderHandler::list(&server, &raw).await
}

#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::PROVIDER_BY_ID,
    params(("id" = Uuid, Path, description = "Provider ID")),
    responses(
        (status = 200, description = "Insurance provider retrieved", body = InsuranceProvider),
        (status = 404, description = "Insurance provider not found")
    ),
    tag = "insurance"
)]
pub async fn get_provider(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<InsuranceProvider>>, ApiError> {
    ProviderHandler::get(&server, id).await
}

#[utoipa::path(
    post,
    path = crate::routes::paths::api_v1::PROVIDERS,
    request_body = ProviderInput,
    responses(
        (status = 201, description = "Insurance provider created", body = InsuranceProvider),
        (status = 409, description = "Provider code already used")
    ),
    tag = "insurance"
)]
pub async fn create_provider(
    State(server): State<ClinicServer>,
    ctx: RequestContext,
    Json(input): Json<ProviderInput>,
) -> Result<(StatusCode, Json<ApiResponse<InsuranceProvider>>), ApiError> {
    let provider = server.insurance().create_provider(input, ctx.actor).await?;
    Ok(created(provider))
}

#[utoipa::path(
    put,
    path = crate::routes::paths::api_v1::PROVIDER_BY_ID,
    params(("id" = Uuid, Path, description = "Provider ID")),
    request_body = ProviderInput,
    responses(
        (status = 200, description = "Insurance provider updated", body = InsuranceProvider),
        (status = 404, description = "Insurance provider not found")
    ),
    tag = "insurance"
)]
pub async fn update_provider(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
    Json(input): Json<ProviderInput>,
) -> Result<Json<ApiResponse<InsuranceProvider>>, ApiError> {
    let provider = server
        .insurance()
        .update_provider(id, input, ctx.actor)
        .await?;
    Ok(Json(api_success(provider)))
}

#[utoipa::path(
    delete,
    path = crate::routes::paths::api_v1::PROVIDER_BY_ID,
    params(("id" = Uuid, Path, description = "Provider ID")),
    responses(
        (status = 204, description = "Insurance provider deleted"),
        (status = 404, description = "Insurance provider not found")
    ),
    tag = "insurance"
)]
pub async fn delete_provider(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> Result<StatusCode, ApiError> {
    ProviderHandler::delete(&server, id, &ctx).await
}

#[utoipa::path(
    post,
    path = crate::routes::paths::api_v1::PROVIDER_RESTORE,
    params(("id" = Uuid, Path, description = "Provider ID")),
    responses(
        (status = 200, description = "Insurance provider restored", body = InsuranceProvider),
        (status = 404, description = "Insurance provider not found")
    ),
    tag = "insurance"
)]
pub async fn restore_provider(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> Result<Json<ApiResponse<InsuranceProvider>>, ApiError> {
    ProviderHandler::restore(&server, id, &ctx).await
}

// ============================================================================
// PLANS
// ============================================================================

#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::PLANS,
    params(ListParams),
    responses(
        (status = 200, description = "Insurance plans retrieved", body = Vec<InsurancePlan>)
    ),
    tag = "insurance"
)]
pub async fn list_plans(
    State(server): State<ClinicServer>,
    Query(raw): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<Vec<InsurancePlan>>>, ApiError> {
    PlanHandler::list(&server, &raw).await
}

#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::PLAN_BY_ID,
    params(("id" = Uuid, Path, description = "Plan ID")),
    responses(
        (status = 200, description = "Insurance plan retrieved", body = InsurancePlan),
        (status = 404, description = "Insurance plan not found")
    ),
    tag = "insurance"
)]
pub async fn get_plan(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<InsurancePlan>>, ApiError> {
    PlanHandler::get(&server, id).await
}

#[utoipa::path(
    post,
    path = crate::routes::paths::api_v1::PLANS,
    request_body = PlanInput,
    responses(
        (status = 201, description = "Insurance plan created", body = InsurancePlan),
        (status = 400, description = "Percent out of range or inverted dates"),
        (status = 404, description = "Provider not found")
    ),
    tag = "insurance"
)]
pub async fn create_plan(
    State(server): State<ClinicServer>,
    ctx: RequestContext,
    Json(input): Json<PlanInput>,
) -> Result<(StatusCode, Json<ApiResponse<InsurancePlan>>), ApiError> {
    let plan = server.insurance().create_plan(input, ctx.actor).await?;
    Ok(created(plan))
}

#[utoipa::path(
    put,
    path = crate::routes::paths::api_v1::PLAN_BY_ID,
    params(("id" = Uuid, Path, description = "Plan ID")),
    request_body = PlanInput,
    responses(
        (status = 200, description = "Insurance plan updated", body = InsurancePlan),
        (status = 404, description = "Insurance plan not found")
    ),
    tag = "insurance"
)]
pub async fn update_plan(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
    Json(input): Json<PlanInput>,
) -> Result<Json<ApiResponse<InsurancePlan>>, ApiError> {
    let plan = server.insurance().update_plan(id, input, ctx.actor).await?;
    Ok(Json(api_success(plan)))
}

#[utoipa::path(
    delete,
    path = crate::routes::paths::api_v1::PLAN_BY_ID,
    params(("id" = Uuid, Path, description = "Plan ID")),
    responses(
        (status = 204, description = "Insurance plan deleted"),
        (status = 404, description = "Insurance plan not found")
    ),
    tag = "insurance"
)]
pub async fn delete_plan(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> Result<StatusCode, ApiError> {
    PlanHandler::delete(&server, id, &ctx).await
}

#[utoipa::path(
    post,
    path = crate::routes::paths::api_v1::PLAN_RESTORE,
    params(("id" = Uuid, Path, description = "Plan ID")),
    responses(
        (status = 200, description = "Insurance plan restored", body = InsurancePlan),
        (status = 404, description = "Insurance plan not found")
    ),
    tag = "insurance"
)]
pub async fn restore_plan(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> Result<Json<ApiResponse<InsurancePlan>>, ApiError> {
    PlanHandler::restore(&server, id, &ctx).await
}

// ============================================================================
// PLAN SERVICES
// ============================================================================

#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::PLAN_SERVICES,
    params(ListParams),
    responses(
        (status = 200, description = "Plan service rules retrieved", body = Vec<PlanService>)
    ),
    tag = "insurance"
)]
pub async fn list_plan_services(
    State(server): State<ClinicServer>,
    Query(raw): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<Vec<PlanService>>>, ApiError> {
    PlanServiceHandler::list(&server, &raw).await
}

#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::PLAN_SERVICE_BY_ID,
    params(("id" = Uuid, Path, description = "Plan service ID")),
    responses(
        (status = 200, description = "Plan service rule retrieved", body = PlanService),
        (status = 404, description = "Plan service rule not found")
    ),
    tag = "insurance"
)]
pub async fn get_plan_service(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PlanService>>, ApiError> {
    PlanServiceHandler::get(&server, id).await
}

#[utoipa::path(
    post,
    path = crate::routes::paths::api_v1::PLAN_SERVICES,
    request_body = PlanServiceInput,
    responses(
        (status = 201, description = "Plan service rule created", body = PlanService),
        (status = 404, description = "Plan or category not found"),
        (status = 409, description = "Plan already has a rule for the category")
    ),
    tag = "insurance"
)]
pub async fn create_plan_service(
    State(server): State<ClinicServer>,
    ctx: RequestContext,
    Json(input): Json<PlanServiceInput>,
) -> Result<(StatusCode, Json<ApiResponse<PlanService>>), ApiError> {
    let rule = server
        .insurance()
        .create_plan_service(input, ctx.actor)
        .await?;
    Ok(created(rule))
}

#[utoipa::path(
    put,
    path = crate::routes::paths::api_v1::PLAN_SERVICE_BY_ID,
    params(("id" = Uuid, Path, description = "Plan service ID")),
    request_body = PlanServiceInput,
    responses(
        (status = 200, description = "Plan service rule updated", body = PlanService),
        (status = 404, description = "Plan service rule not found")
    ),
    tag = "insurance"
)]
pub async fn update_plan_service(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
    Json(input): Json<PlanServiceInput>,
) -> Result<Json<ApiResponse<PlanService>>, ApiError> {
    let rule = server
        .insurance()
        .update_plan_service(id, input, ctx.actor)
        .await?;
    Ok(Json(api_success(rule)))
}

#[utoipa::path(
    delete,
    path = crate::routes::paths::api_v1::PLAN_SERVICE_BY_ID,
    params(("id" = Uuid, Path, description = "Plan service ID")),
    responses(
        (status = 204, description = "Plan service rule deleted"),
        (status = 404, description = "Plan service rule not found")
    ),
    tag = "insurance"
)]
pub async fn delete_plan_service(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> Result<StatusCode, ApiError> {
    PlanServiceHandler::delete(&server, id, &ctx).await
}

/// Restore a rule unless its plan has since been given another rule for
/// the same category
#[utoipa::path(
    post,
    path = crate::routes::paths::api_v1::PLAN_SERVICE_RESTORE,
    params(("id" = Uuid, Path, description = "Plan service ID")),
    responses(
        (status = 200, description = "Plan service rule restored", body = PlanService),
        (status = 404, description = "Plan service rule not found"),
        (status = 409, description = "A live rule already covers the category")
    ),
    tag = "insurance"
)]
pub async fn restore_plan_service(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> Result<Json<ApiResponse<PlanService>>, ApiError> {
    let rule = server.repos.plan_services.get_including_deleted(id).await?;
    if let Some(live) = server
        .insurance()
        .plan_service_for(rule.plan_id, rule.category_id)
        .await?
    {
        if live.id != rule.id {
            return Err(ApiError::Conflict {
                message: format!(
                    "plan {} already has a live rule for category {}",
                    rule.plan_id, rule.category_id
                ),
                code: error_common::codes::database::CONSTRAINT_VIOLATION,
            });
        }
    }
    PlanServiceHandler::restore(&server, id, &ctx).await
}

// ============================================================================
// TARIFFS
// ============================================================================

#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::TARIFFS,
    params(ListParams),
    responses(
        (status = 200, description = "Tariffs retrieved", body = Vec<InsuranceTariff>)
    ),
    tag = "insurance"
)]
pub async fn list_tariffs(
    State(server): State<ClinicServer>,
    Query(raw): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<Vec<InsuranceTariff>>>, ApiError> {
    TariffHandler::list(&server, &raw).await
}

#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::TARIFF_BY_ID,
    params(("id" = Uuid, Path, description = "Tariff ID")),
    responses(
        (status = 200, description = "Tariff retrieved", body = InsuranceTariff),
        (status = 404, description = "Tariff not found")
    ),
    tag = "insurance"
)]
pub async fn get_tariff(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<InsuranceTariff>>, ApiError> {
    TariffHandler::get(&server, id).await
}

#[utoipa::path(
    post,
    path = crate::routes::paths::api_v1::TARIFFS,
    request_body = TariffInput,
    responses(
        (status = 201, description = "Tariff created", body = InsuranceTariff),
        (status = 400, description = "Insurer share above the total price"),
        (status = 409, description = "Overlaps another tariff for the same plan and service")
    ),
    tag = "insurance"
)]
pub async fn create_tariff(
    State(server): State<ClinicServer>,
    ctx: RequestContext,
    Json(input): Json<TariffInput>,
) -> Result<(StatusCode, Json<ApiResponse<InsuranceTariff>>), ApiError> {
    let tariff = server.insurance().create_tariff(input, ctx.actor).await?;
    Ok(created(tariff))
}

#[utoipa::path(
    put,
    path = crate::routes::paths::api_v1::TARIFF_BY_ID,
    params(("id" = Uuid, Path, description = "Tariff ID")),
    request_body = TariffInput,
    responses(
        (status = 200, description = "Tariff updated", body = InsuranceTariff),
        (status = 404, description = "Tariff not found")
    ),
    tag = "insurance"
)]
pub async fn update_tariff(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
    Json(input): Json<TariffInput>,
) -> Result<Json<ApiResponse<InsuranceTariff>>, ApiError> {
    let tariff = server
        .insurance()
        .update_tariff(id, input, ctx.actor)
        .await?;
    Ok(Json(api_success(tariff)))
}

#[utoipa::path(
    delete,
    path = crate::routes::paths::api_v1::TARIFF_BY_ID,
    params(("id" = Uuid, Path, description = "Tariff ID")),
    responses(
        (status = 204, description = "Tariff deleted"),
        (status = 404, description = "Tariff not found")
    ),
    tag = "insurance"
)]
pub async fn delete_tariff(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> Result<StatusCode, ApiError> {
    TariffHandler::delete(&server, id, &ctx).await
}

#[utoipa::path(
    post,
    path = crate::routes::paths::api_v1::TARIFF_RESTORE,
    params(("id" = Uuid, Path, description = "Tariff ID")),
    responses(
        (status = 200, description = "Tariff restored", body = InsuranceTariff),
        (status = 404, description = "Tariff not found")
    ),
    tag = "insurance"
)]
pub async fn restore_tariff(
    State(server): State<ClinicServer>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> Result<Json<ApiResponse<InsuranceTariff>>, ApiError> {
    TariffHandler::restore(&server, id, &ctx).await
}

// ============================================================================
// COVERAGE PREVIEW
// ============================================================================

fn default_quantity() -> i32 {
    1
}

/// What a service would cost the patient, without recording anything
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CoverageRequest {
    pub patient_id: Uuid,
    pub service_id: Uuid,
    #[serde(default = "default_quantity")]
    #[schema(example = 1, minimum = 1, maximum = 1000)]
    pub quantity: i32,
    /// Visit day; defaults to today in clinic time
    pub date: Option<NaiveDate>,
}

impl RequestValidation for CoverageRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_uuid!(self.patient_id, "patient_id is required");
        validate_uuid!(self.service_id, "service_id is required");
        validate_range!(self.quantity, 1, 1000, "quantity must be between 1 and 1000");
        Ok(())
    }
}

#[utoipa::path(
    post,
    path = crate::routes::paths::api_v1::INSURANCE_CALCULATE,
    request_body = CoverageRequest,
    responses(
        (status = 200, description = "Coverage split for the service", body = CombinedInsuranceCalculationViewModel),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Patient or service not found")
    ),
    tag = "insurance"
)]
pub async fn calculate_coverage(
    State(server): State<ClinicServer>,
    ctx: RequestContext,
    Json(req): Json<CoverageRequest>,
) -> Result<Json<ApiResponse<CombinedInsuranceCalculationViewModel>>, ApiError> {
    req.validate()?;
    server.reception.patient(req.patient_id).await?;
    let on_date = req.date.unwrap_or_else(|| clinic_day(Utc::now()));

    let preview = server
        .insurance()
        .preview(req.patient_id, req.service_id, req.quantity, on_date)
        .await?;
    info!(
        patient_id = %req.patient_id,
        service_id = %req.service_id,
        %on_date,
        request_id = %ctx.request_id,
        "Coverage preview calculated"
    );

    let view = CombinedInsuranceCalculationViewModel::from_preview(
        &preview,
        server.config.clinic.currency_display,
    );
    Ok(Json(api_success(view)))
}
