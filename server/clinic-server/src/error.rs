use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use billing_service::BillingError;
use database_layer::DatabaseError;
use error_common::{codes, ClinicError};
use insurance_service::InsuranceError;
use reception_service::ReceptionError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

/// Standard API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Error type
    pub error_type: String,
    /// Stable domain error code, e.g. `BUSINESS_5002`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Human-readable error message
    pub message: String,
    /// Field-specific validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<HashMap<String, Vec<String>>>,
    /// Timestamp when error occurred
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Suggested actions for resolving the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

/// Standard API success response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMetadata>,
}

/// Response metadata for pagination
#[derive(Debug, Serialize, Deserialize)]
pub struct ResponseMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

/// Main API error enum
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field_errors: Option<HashMap<String, Vec<String>>>,
        code: &'static str,
    },

    #[error("Resource not found: {message}")]
    NotFound { message: String, code: &'static str },

    #[error("Resource conflict: {message}")]
    Conflict { message: String, code: &'static str },

    /// The request is well formed but a clinic rule forbids it
    #[error("Unprocessable entity: {message}")]
    UnprocessableEntity { message: String, code: &'static str },

    #[error("Service unavailable: {message}")]
    ServiceUnavailable { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl ApiError {
    /// Create a validation error with field-specific errors
    pub fn validation_with_fields(
        message: impl Into<String>,
        field_errors: HashMap<String, Vec<String>>,
    ) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors: Some(field_errors),
            code: codes::validation::INVALID_INPUT,
        }
    }

    /// Create a simple validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors: None,
            code: codes::validation::INVALID_INPUT,
        }
    }

    /// Validation error pinned to one field
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut field_errors = HashMap::new();
        field_errors.insert(field.to_string(), vec![message.clone()]);
        Self::validation_with_fields(format!("{field}: {message}"), field_errors)
    }

    pub fn not_found(resource_type: impl Into<String>) -> Self {
        Self::NotFound {
            message: resource_type.into(),
            code: codes::database::NOT_FOUND,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Map a domain error onto an HTTP error, keeping its code
    pub fn from_domain(code: &'static str, err: ClinicError) -> Self {
        match err {
            ClinicError::NetworkError(message) | ClinicError::ServerError(message) => {
                Self::ServiceUnavailable { message }
            }
            ClinicError::DatabaseError(message) => {
                error!(code, error = %message, "Database operation failed");
                Self::internal("Database operation failed. Please try again.")
            }
            ClinicError::ValidationError(message) => Self::Validation {
                message,
                field_errors: None,
                code,
            },
            ClinicError::NotFound(message) => Self::NotFound { message, code },
            ClinicError::Conflict(message) => Self::Conflict { message, code },
            ClinicError::BusinessError(message) => Self::UnprocessableEntity { message, code },
            other @ (ClinicError::ConfigError(_)
            | ClinicError::InternalError(_)
            | ClinicError::Other(_)) => Self::internal(other.to_string()),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::UnprocessableEntity { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "validation_error",
            ApiError::NotFound { .. } => "not_found",
            ApiError::Conflict { .. } => "conflict",
            ApiError::UnprocessableEntity { .. } => "unprocessable_entity",
            ApiError::ServiceUnavailable { .. } => "service_unavailable",
            ApiError::Internal { .. } => "internal_error",
        }
    }

    pub fn error_code(&self) -> Option<&'static str> {
        match self {
            ApiError::Validation { code, .. }
            | ApiError::NotFound { code, .. }
            | ApiError::Conflict { code, .. }
            | ApiError::UnprocessableEntity { code, .. } => Some(*code),
            ApiError::ServiceUnavailable { .. } => Some(codes::system::UNAVAILABLE),
            ApiError::Internal { .. } => Some(codes::system::INTERNAL),
        }
    }

    /// Get suggested actions for resolving the error
    pub fn suggestions(&self) -> Option<Vec<String>> {
        match self {
            ApiError::Validation { .. } => Some(vec![
                "Check the request payload for invalid fields".to_string(),
                "Ensure all required fields are provided".to_string(),
            ]),
            ApiError::NotFound { .. } => Some(vec![
                "Verify the resource ID is correct".to_string(),
                "Deleted records can be listed with include_deleted=true".to_string(),
            ]),
            ApiError::Conflict { .. } => Some(vec![
                "A live record already uses this code or number".to_string(),
            ]),
            ApiError::UnprocessableEntity { code, .. } if *code == codes::business::INVALID_TRANSITION => {
                Some(vec![
                    "Receptions move registered -> in_progress -> completed".to_string(),
                    "Settle the balance before completing, refund before cancelling".to_string(),
                ])
            }
            ApiError::ServiceUnavailable { .. } => Some(vec![
                "Try again in a few moments".to_string(),
                "Contact support if the issue persists".to_string(),
            ]),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4().to_string();
        let status_code = self.status_code();

        if status_code.is_server_error() {
            error!(
                error_id = %error_id,
                error_type = %self.error_type(),
                status_code = %status_code.as_u16(),
                error = %self,
                "API error occurred"
            );
        } else {
            warn!(
                error_id = %error_id,
                error_type = %self.error_type(),
                error_code = ?self.error_code(),
                status_code = %status_code.as_u16(),
                error = %self,
                "Request rejected"
            );
        }

        let field_errors = match &self {
            ApiError::Validation { field_errors, .. } => field_errors.clone(),
            _ => None,
        };

        let error_response = ApiErrorResponse {
            error_id,
            error_type: self.error_type().to_string(),
            error_code: self.error_code().map(str::to_string),
            message: self.to_string(),
            field_errors,
            timestamp: chrono::Utc::now(),
            suggestions: self.suggestions(),
        };

        (status_code, Json(error_response)).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        let code = err.code();
        ApiError::from_domain(code, err.into())
    }
}

impl From<InsuranceError> for ApiError {
    fn from(err: InsuranceError) -> Self {
        let code = err.code();
        ApiError::from_domain(code, err.into())
    }
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        let code = err.code();
        ApiError::from_domain(code, err.into())
    }
}

impl From<ReceptionError> for ApiError {
    fn from(err: ReceptionError) -> Self {
        let code = err.code();
        ApiError::from_domain(code, err.into())
    }
}

/// Helper trait for converting results to API responses
pub trait IntoApiResponse<T> {
    fn into_api_response(self) -> Result<ApiResponse<T>, ApiError>;
}

impl<T, E> IntoApiResponse<T> for Result<T, E>
where
    E: Into<ApiError>,
{
    fn into_api_response(self) -> Result<ApiResponse<T>, ApiError> {
        self.map(api_success).map_err(Into::into)
    }
}

/// Helper function to create successful API responses
pub fn api_success<T>(data: T) -> ApiResponse<T> {
    ApiResponse {
        success: true,
        data,
        metadata: None,
    }
}

/// Helper function to create successful API responses with metadata
pub fn api_success_with_meta<T>(data: T, metadata: ResponseMetadata) -> ApiResponse<T> {
    ApiResponse {
        success: true,
        data,
        metadata: Some(metadata),
    }
}
