use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

use crate::error::{api_success, ApiResponse};
use crate::server::ClinicServer;

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// `healthy` or `degraded`
    #[schema(example = "healthy")]
    pub status: String,
    /// Current timestamp in RFC3339 format
    #[schema(example = "2024-04-03T06:00:00Z")]
    pub timestamp: String,
    #[schema(example = "1.0.0")]
    pub version: String,
    /// Uptime in seconds
    #[schema(example = 3600)]
    pub uptime: u64,
    /// Individual dependency checks
    pub checks: HashMap<String, String>,
}

/// Version information response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VersionResponse {
    #[schema(example = "clinic-server")]
    pub name: String,
    #[schema(example = "1.0.0")]
    pub version: String,
    pub clinic_name: String,
    /// `postgres` or `memory`
    pub storage: String,
}

/// Health check handler
#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::HEALTH,
    tag = "health",
    responses(
        (status = 200, description = "System is healthy", body = HealthResponse),
        (status = 503, description = "A dependency is unavailable", body = HealthResponse)
    )
)]
pub async fn health_check(
    State(server): State<ClinicServer>,
) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let mut checks = HashMap::new();
    let database_ok = match &server.db_pool {
        Some(pool) => {
            let healthy = pool.is_healthy().await;
            let state = if healthy { "healthy" } else { "unreachable" };
            checks.insert("database".to_string(), state.to_string());
            healthy
        }
        None => {
            checks.insert("database".to_string(), "in-memory".to_string());
            true
        }
    };

    let (status, code) = if database_ok {
        ("healthy", StatusCode::OK)
    } else {
        tracing::warn!("Health check failed: database unreachable");
        ("degraded", StatusCode::SERVICE_UNAVAILABLE)
    };

    let response = HealthResponse {
        status: status.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: server.uptime_seconds(),
        checks,
    };

    (code, Json(api_success(response)))
}

/// Version information handler
#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::VERSION,
    tag = "health",
    responses(
        (status = 200, description = "Version information retrieved successfully", body = VersionResponse)
    )
)]
pub async fn version_info(State(server): State<ClinicServer>) -> Json<ApiResponse<VersionResponse>> {
    let storage = match server.db_pool {
        Some(_) => "postgres",
        None => "memory",
    };
    Json(api_success(VersionResponse {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        clinic_name: server.config.clinic.name.clone(),
        storage: storage.to_string(),
    }))
}
