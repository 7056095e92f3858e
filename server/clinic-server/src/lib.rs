//! Clinic Engine Server - reception, insurance and billing HTTP API
//!
//! This library wires the domain services (`reception-service`,
//! `insurance-service`, `billing-service`) to REST endpoints and renders the
//! Persian view models used by the reception desk: the accordion reception
//! form, the combined insurance calculation and the payment receipt.

pub mod error;
pub mod formatting;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod types;
pub mod validation;
pub mod view_models;

// Re-export commonly used types
pub use error::{ApiError, ApiResponse};
pub use server::ClinicServer;

use std::time::Duration;

use axum::{middleware::from_fn, Router};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Create the main application router with all routes and middleware
pub fn create_app(server: ClinicServer) -> Router {
    let timeout = Duration::from_secs(server.config.server.request_timeout_secs);

    routes::create_routes()
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(middleware::make_request_span))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(middleware::create_cors_layer())
                .layer(from_fn(middleware::request_timing_middleware))
                .layer(TimeoutLayer::new(timeout)),
        )
        .with_state(server)
}
