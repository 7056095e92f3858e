use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::server::ClinicServer;

/// Main OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        crate::handlers::health::health_check,
        crate::handlers::health::version_info,

        // Patients
        crate::handlers::patients::list_patients,
        crate::handlers::patients::get_patient,
        crate::handlers::patients::create_patient,
        crate::handlers::patients::update_patient,
        crate::handlers::patients::delete_patient,
        crate::handlers::patients::restore_patient,
        crate::handlers::patients::list_patient_insurances,
        crate::handlers::patients::get_patient_insurance,
        crate::handlers::patients::create_patient_insurance,
        crate::handlers::patients::update_patient_insurance,
        crate::handlers::patients::delete_patient_insurance,
        crate::handlers::patients::restore_patient_insurance,

        // Catalog
        crate::handlers::catalog::list_doctors,
        crate::handlers::catalog::get_doctor,
        crate::handlers::catalog::create_doctor,
        crate::handlers::catalog::update_doctor,
        crate::handlers::catalog::delete_doctor,
        crate::handlers::catalog::restore_doctor,
        crate::handlers::catalog::list_categories,
        crate::handlers::catalog::get_category,
        crate::handlers::catalog::create_category,
        crate::handlers::catalog::update_category,
        crate::handlers::catalog::delete_category,
        crate::handlers::catalog::restore_category,
        crate::handlers::catalog::list_services,
        crate::handlers::catalog::get_service,
        crate::handlers::catalog::create_service,
        crate::handlers::catalog::update_service,
        crate::handlers::catalog::delete_service,
        crate::handlers::catalog::restore_service,

        // Insurance
        crate::handlers::insurance::list_providers,
        crate::handlers::insurance::get_provider,
        crate::handlers::insurance::create_provider,
        crate::handlers::insurance::update_provider,
        crate::handlers::insurance::delete_provider,
        crate::handlers::insurance::restore_provider,
        crate::handlers::insurance::list_plans,
        crate::handlers::insurance::get_plan,
        crate::handlers::insurance::create_plan,
        crate::handlers::insurance::update_plan,
        crate::handlers::insurance::delete_plan,
        crate::handlers::insurance::restore_plan,
        crate::handlers::insurance::list_plan_services,
        crate::handlers::insurance::get_plan_service,
        crate::handlers::insurance::create_plan_service,
        crate::handlers::insurance::update_plan_service,
        crate::handlers::insurance::delete_plan_service,
        crate::handlers::insurance::restore_plan_service,
        crate::handlers::insurance::list_tariffs,
        crate::handlers::insurance::get_tariff,
        crate::handlers::insurance::create_tariff,
        crate::handlers::insurance::update_tariff,
        crate::handlers::insurance::delete_tariff,
        crate::handlers::insurance::restore_tariff,
        crate::handlers::insurance::calculate_coverage,

        // Receptions
        crate::handlers::receptions::list_receptions,
        crate::handlers::receptions::get_reception,
        crate::handlers::receptions::create_reception,
        crate::handlers::receptions::add_service,
        crate::handlers::receptions::remove_service,
        crate::handlers::receptions::recalculate,
        crate::handlers::receptions::change_status,
        crate::handlers::receptions::reception_form,
        crate::handlers::receptions::insurance_calculation,

        // Payments
        crate::handlers::payments::list_payments,
        crate::handlers::payments::record_payment,
        crate::handlers::payments::record_refund,
        crate::handlers::payments::payment_receipt,
    ),
    components(
        schemas(
            // Health schemas
            crate::handlers::health::HealthResponse,
            crate::handlers::health::VersionResponse,

            // Records
            database_layer::AuditInfo,
            database_layer::Patient,
            database_layer::Doctor,
            database_layer::ServiceCategory,
            database_layer::MedicalService,
            database_layer::InsuranceProvider,
            database_layer::InsurancePlan,
            database_layer::PlanService,
            database_layer::InsuranceTariff,
            database_layer::PatientInsurance,
            database_layer::Reception,
            database_layer::ReceptionService,
            database_layer::InsuranceCalculation,
            database_layer::Payment,

            // Inputs
            reception_service::PatientInput,
            reception_service::DoctorInput,
            reception_service::ServiceCategoryInput,
            reception_service::MedicalServiceInput,
            reception_service::ReceptionInput,
            reception_service::AddServiceInput,
            reception_service::StatusChange,
            insurance_service::ProviderInput,
            insurance_service::PlanInput,
            insurance_service::PlanServiceInput,
            insurance_service::TariffInput,
            insurance_service::PatientInsuranceInput,
            billing_service::PaymentInput,
            crate::handlers::insurance::CoverageRequest,

            // Workflow results
            reception_service::ReceptionDetails,
            reception_service::ReceptionLine,
            insurance_service::CoveragePreview,
            billing_service::Balance,
            crate::handlers::payments::ReceptionPayments,

            // Persian views
            crate::view_models::ReceptionFormViewModel,
            crate::view_models::FormSection,
            crate::view_models::FormSectionKey,
            crate::view_models::CombinedInsuranceCalculationViewModel,
            crate::view_models::CalculationRowViewModel,
            crate::view_models::InsuranceShareViewModel,
            crate::view_models::PaymentReceiptViewModel,
            crate::view_models::ReceiptItemViewModel,
        )
    ),
    tags(
        (name = "health", description = "Liveness and version endpoints"),
        (name = "patients", description = "Patient records and their insurances"),
        (name = "catalog", description = "Doctors, service categories and priced services"),
        (name = "insurance", description = "Insurers, plans, coverage rules, tariffs and coverage calculation"),
        (name = "receptions", description = "Reception workflow, accordion form and insurance calculation views"),
        (name = "payments", description = "Payments, refunds and receipts"),
    ),
    info(
        title = "Clinic Engine API",
        version = "1.0.0",
        description = "Reception, insurance and billing API for outpatient clinics. Every list endpoint accepts `page`, `page_size`, `search`, `sort_by`, `sort_desc`, `include_deleted` and field filters; write endpoints take the acting user from `X-User-Id`.",
    ),
)]
pub struct ApiDoc;

/// Create OpenAPI documentation routes
pub fn create_docs_routes() -> Router<ClinicServer> {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
