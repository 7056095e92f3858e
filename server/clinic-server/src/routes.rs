pub mod paths;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::{
    handlers::{catalog, health, insurance, patients, payments, receptions},
    openapi,
    server::ClinicServer,
};

/// Create health check routes
pub fn health_routes() -> Router<ClinicServer> {
    Router::new()
        .route(paths::health::HEALTH, get(health::health_check))
        .route(paths::health::VERSION, get(health::version_info))
}

/// Patient records and the insurances attached to them
pub fn patient_routes() -> Router<ClinicServer> {
    Router::new()
        .route(
            paths::patients::PATIENTS,
            get(patients::list_patients).post(patients::create_patient),
        )
        .route(
            paths::patients::PATIENT_BY_ID,
            get(patients::get_patient)
                .put(patients::update_patient)
                .delete(patients::delete_patient),
        )
        .route(paths::patients::RESTORE, post(patients::restore_patient))
        .route(
            paths::patients::INSURANCES,
            get(patients::list_patient_insurances).post(patients::create_patient_insurance),
        )
        .route(
            paths::patients::INSURANCE_BY_ID,
            get(patients::get_patient_insurance)
                .put(patients::update_patient_insurance)
                .delete(patients::delete_patient_insurance),
        )
        .route(
            paths::patients::INSURANCE_RESTORE,
            post(patients::restore_patient_insurance),
        )
}

/// Doctors, service categories and priced services
pub fn catalog_routes() -> Router<ClinicServer> {
    Router::new()
        .route(
            paths::catalog::DOCTORS,
            get(catalog::list_doctors).post(catalog::create_doctor),
        )
        .route(
            paths::catalog::DOCTOR_BY_ID,
            get(catalog::get_doctor)
                .put(catalog::update_doctor)
                .delete(catalog::delete_doctor),
        )
        .route(paths::catalog::DOCTOR_RESTORE, post(catalog::restore_doctor))
        .route(
            paths::catalog::CATEGORIES,
            get(catalog::list_categories).post(catalog::create_category),
        )
        .route(
            paths::catalog::CATEGORY_BY_ID,
            get(catalog::get_category)
                .put(catalog::update_category)
                .delete(catalog::delete_category),
        )
        .route(paths::catalog::CATEGORY_RESTORE, post(catalog::restore_category))
        .route(
            paths::catalog::SERVICES,
            get(catalog::list_services).post(catalog::create_service),
        )
        .route(
            paths::catalog::SERVICE_BY_ID,
            get(catalog::get_service)
                .put(catalog::update_service)
                .delete(catalog::delete_service),
        )
        .route(paths::catalog::SERVICE_RESTORE, post(catalog::restore_service))
}

/// Insurers, plans, coverage rules, tariffs and the coverage calculator
pub fn insurance_routes() -> Router<ClinicServer> {
    Router::new()
        .route(
            paths::insurance::PROVIDERS,
            get(insurance::list_providers).post(insurance::create_provider),
        )
        .route(
            paths::insurance::PROVIDER_BY_ID,
            get(insurance::get_provider)
                .put(insurance::update_provider)
                .delete(insurance::delete_provider),
        )
        .route(paths::insurance::PROVIDER_RESTORE, post(insurance::restore_provider))
        .route(
            paths::insurance::PLANS,
            get(insurance::list_plans).post(insurance::create_plan),
        )
        .route(
            paths::insurance::PLAN_BY_ID,
            get(insurance::get_plan)
                .put(insurance::update_plan)
                .delete(insurance::delete_plan),
        )
        .route(paths::insurance::PLAN_RESTORE, post(insurance::restore_plan))
        .route(
            paths::insurance::PLAN_SERVICES,
            get(insurance::list_plan_services).post(insurance::create_plan_service),
        )
        .route(
            paths::insurance::PLAN_SERVICE_BY_ID,
            get(insurance::get_plan_service)
                .put(insurance::update_plan_service)
                .delete(insurance::delete_plan_service),
        )
        .route(
            paths::insurance::PLAN_SERVICE_RESTORE,
            post(insurance::restore_plan_service),
        )
        .route(
            paths::insurance::TARIFFS,
            get(insurance::list_tariffs).post(insurance::create_tariff),
        )
        .route(
            paths::insurance::TARIFF_BY_ID,
            get(insurance::get_tariff)
                .put(insurance::update_tariff)
                .delete(insurance::delete_tariff),
        )
        .route(paths::insurance::TARIFF_RESTORE, post(insurance::restore_tariff))
        .route(paths::insurance::CALCULATE, post(insurance::calculate_coverage))
}

/// Front desk workflow and its Persian views
pub fn reception_routes() -> Router<ClinicServer> {
    Router::new()
        .route(
            paths::receptions::RECEPTIONS,
            get(receptions::list_receptions).post(receptions::create_reception),
        )
        .route(paths::receptions::RECEPTION_BY_ID, get(receptions::get_reception))
        .route(paths::receptions::SERVICES, post(receptions::add_service))
        .route(paths::receptions::SERVICE_BY_ID, delete(receptions::remove_service))
        .route(paths::receptions::RECALCULATE, post(receptions::recalculate))
        .route(paths::receptions::STATUS, put(receptions::change_status))
        .route(paths::receptions::FORM, get(receptions::reception_form))
        .route(
            paths::receptions::INSURANCE_CALCULATION,
            get(receptions::insurance_calculation),
        )
}

pub fn payment_routes() -> Router<ClinicServer> {
    Router::new()
        .route(
            paths::payments::PAYMENTS,
            get(payments::list_payments).post(payments::record_payment),
        )
        .route(paths::payments::REFUNDS, post(payments::record_refund))
        .route(paths::payments::RECEIPT, get(payments::payment_receipt))
}

/// Create API v1 routes
pub fn api_v1_routes() -> Router<ClinicServer> {
    Router::new()
        .merge(health_routes())
        .merge(patient_routes())
        .merge(catalog_routes())
        .merge(insurance_routes())
        .merge(reception_routes())
        .merge(payment_routes())
}

/// Create all application routes
pub fn create_routes() -> Router<ClinicServer> {
    Router::new()
        // Health check routes for load balancers
        .merge(health_routes())
        // API documentation routes
        .merge(openapi::create_docs_routes())
        .nest(paths::API_V1, api_v1_routes())
}
