//! Middleware modules for request processing

pub mod request_context;

pub use request_context::{make_request_span, RequestContext};

use axum::{
    extract::Request,
    http::{header, HeaderName, Method},
    middleware::Next,
    response::Response,
};
use std::time::{Duration, Instant};
use tower_http::cors::{Any, CorsLayer};

/// Request timing middleware; logs requests slower than one second
pub async fn request_timing_middleware(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let method = request.method().clone();
    let start = Instant::now();
    let response = next.run(request).await;
    let duration = start.elapsed();

    if duration > Duration::from_secs(1) {
        tracing::warn!(
            method = %method,
            path = %path,
            duration_ms = duration.as_millis(),
            "Slow request detected"
        );
    }

    response
}

/// CORS for the reception front end
pub fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(request_context::REQUEST_ID_HEADER),
            HeaderName::from_static(request_context::USER_ID_HEADER),
        ])
        .expose_headers([HeaderName::from_static(request_context::REQUEST_ID_HEADER)])
        .max_age(Duration::from_secs(3600))
}
