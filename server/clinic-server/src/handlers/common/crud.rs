//! Generic CRUD handler trait
//!
//! Implementors name their repository; list, get, soft delete and restore
//! come for free. Creates and updates go through the domain services, which
//! own the validation rules, so they stay in the resource modules.

use std::collections::HashMap;

use async_trait::async_trait;
use axum::{http::StatusCode, Json};
use database_layer::{Entity, Repo};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::error::{api_success, ApiError, ApiResponse};
use crate::middleware::RequestContext;
use crate::server::ClinicServer;
use crate::types::{list_query, paginated};

#[async_trait]
pub trait CrudHandler: Send + Sync + 'static {
    type Record: Entity + Serialize;

    fn repository(server: &ClinicServer) -> &Repo<Self::Record>;

    /// Paged list; unreserved query keys are field filters
    async fn list(
        server: &ClinicServer,
        raw: &HashMap<String, String>,
    ) -> Result<Json<ApiResponse<Vec<Self::Record>>>, ApiError> {
        let query = list_query(raw, &server.config.pagination)?;
        let page = Self::repository(server).list(&query).await?;
        Ok(Json(paginated(page)))
    }

    async fn get(
        server: &ClinicServer,
        id: Uuid,
    ) -> Result<Json<ApiResponse<Self::Record>>, ApiError> {
        let record = Self::repository(server).get(id).await?;
        Ok(Json(api_success(record)))
    }

    /// Soft delete, stamping the actor
    async fn delete(
        server: &ClinicServer,
        id: Uuid,
        ctx: &RequestContext,
    ) -> Result<StatusCode, ApiError> {
        Self::repository(server).soft_delete(id, ctx.actor).await?;
        info!(
            resource = <Self::Record as Entity>::RESOURCE,
            %id,
            request_id = %ctx.request_id,
            "Record soft-deleted"
        );
        Ok(StatusCode::NO_CONTENT)
    }

    async fn restore(
        server: &ClinicServer,
        id: Uuid,
        ctx: &RequestContext,
    ) -> Result<Json<ApiResponse<Self::Record>>, ApiError> {
        let record = Self::repository(server).restore(id, ctx.actor).await?;
        info!(
            resource = <Self::Record as Entity>::RESOURCE,
            %id,
            request_id = %ctx.request_id,
            "Record restored"
        );
        Ok(Json(api_success(record)))
    }
}

/// `201 Created` with the enveloped record
pub fn created<T>(record: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, Json(api_success(record)))
}
