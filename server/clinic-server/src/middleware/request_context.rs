//! Per-request context: correlation ID and the acting staff member
//!
//! The request ID is set by `SetRequestIdLayer` (or passed in by the caller)
//! and echoed back on the response. The actor comes from `X-User-Id` and is
//! stamped into `created_by` / `updated_by` / `deleted_by` on every write.

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::FromRequestParts;
use axum::http::{request::Parts, HeaderMap, Request};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const USER_ID_HEADER: &str = "x-user-id";

/// Request context for tracing and audit stamping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Unique request ID for tracing
    pub request_id: String,
    /// Staff member performing the request, when identified
    pub actor: Option<Uuid>,
}

impl RequestContext {
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, ApiError> {
        let request_id = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let actor = match headers.get(USER_ID_HEADER) {
            None => None,
            Some(value) => {
                let raw = value
                    .to_str()
                    .map_err(|_| ApiError::invalid_field(USER_ID_HEADER, "must be a UUID"))?;
                let id = Uuid::parse_str(raw.trim())
                    .map_err(|_| ApiError::invalid_field(USER_ID_HEADER, "must be a UUID"))?;
                Some(id)
            }
        };

        Ok(Self { request_id, actor })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers)
    }
}

/// Span for `TraceLayer` carrying the request ID
pub fn make_request_span(request: &Request<Body>) -> tracing::Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("-");
    tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_context_reads_headers() {
        let actor = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("req-42"));
        headers.insert(
            USER_ID_HEADER,
            HeaderValue::from_str(&actor.to_string()).unwrap(),
        );

        let ctx = RequestContext::from_headers(&headers).unwrap();
        assert_eq!(ctx.request_id, "req-42");
        assert_eq!(ctx.actor, Some(actor));
    }

    #[test]
    fn test_missing_headers_generate_request_id() {
        let ctx = RequestContext::from_headers(&HeaderMap::new()).unwrap();
        assert!(Uuid::parse_str(&ctx.request_id).is_ok());
        assert_eq!(ctx.actor, None);
    }

    #[test]
    fn test_malformed_actor_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("reception-desk"));
        let err = RequestContext::from_headers(&headers).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }
}
