//! Centralized API route path constants
//!
//! Router constants are relative to the module's mount point and use axum's
//! `:param` syntax. The `api_v1` module repeats every route as a full path in
//! OpenAPI `{param}` syntax for the `#[utoipa::path]` attributes; keep the two
//! in step when adding a route.

/// API base paths
pub const API_V1: &str = "/api/v1";

/// Health check endpoints, mounted at the root and under `API_V1`
pub mod health {
    pub const HEALTH: &str = "/health";
    pub const VERSION: &str = "/version";
}

pub mod patients {
    pub const PATIENTS: &str = "/patients";
    pub const PATIENT_BY_ID: &str = "/patients/:id";
    pub const RESTORE: &str = "/patients/:id/restore";
    pub const INSURANCES: &str = "/patients/:id/insurances";
    pub const INSURANCE_BY_ID: &str = "/patients/:id/insurances/:insurance_id";
    pub const INSURANCE_RESTORE: &str = "/patients/:id/insurances/:insurance_id/restore";
}

/// Doctors and the service catalogue
pub mod catalog {
    pub const DOCTORS: &str = "/doctors";
    pub const DOCTOR_BY_ID: &str = "/doctors/:id";
    pub const DOCTOR_RESTORE: &str = "/doctors/:id/restore";
    pub const CATEGORIES: &str = "/service-categories";
    pub const CATEGORY_BY_ID: &str = "/service-categories/:id";
    pub const CATEGORY_RESTORE: &str = "/service-categories/:id/restore";
    pub const SERVICES: &str = "/services";
    pub const SERVICE_BY_ID: &str = "/services/:id";
    pub const SERVICE_RESTORE: &str = "/services/:id/restore";
}

pub mod insurance {
    pub const PROVIDERS: &str = "/insurance/providers";
    pub const PROVIDER_BY_ID: &str = "/insurance/providers/:id";
    pub const PROVIDER_RESTORE: &str = "/insurance/providers/:id/restore";
    pub const PLANS: &str = "/insurance/plans";
    pub const PLAN_BY_ID: &str = "/insurance/plans/:id";
    pub const PLAN_RESTORE: &str = "/insurance/plans/:id/restore";
    pub const PLAN_SERVICES: &str = "/insurance/plan-services";
    pub const PLAN_SERVICE_BY_ID: &str = "/insurance/plan-services/:id";
    pub const PLAN_SERVICE_RESTORE: &str = "/insurance/plan-services/:id/restore";
    pub const TARIFFS: &str = "/insurance/tariffs";
    pub const TARIFF_BY_ID: &str = "/insurance/tariffs/:id";
    pub const TARIFF_RESTORE: &str = "/insurance/tariffs/:id/restore";
    pub const CALCULATE: &str = "/insurance/calculate";
}

pub mod receptions {
    pub const RECEPTIONS: &str = "/receptions";
    pub const RECEPTION_BY_ID: &str = "/receptions/:id";
    pub const SERVICES: &str = "/receptions/:id/services";
    pub const SERVICE_BY_ID: &str = "/receptions/:id/services/:line_id";
    pub const RECALCULATE: &str = "/receptions/:id/recalculate";
    pub const STATUS: &str = "/receptions/:id/status";
    pub const FORM: &str = "/receptions/:id/form";
    pub const INSURANCE_CALCULATION: &str = "/receptions/:id/insurance-calculation";
}

pub mod payments {
    pub const PAYMENTS: &str = "/receptions/:id/payments";
    pub const REFUNDS: &str = "/receptions/:id/refunds";
    pub const RECEIPT: &str = "/payments/:id/receipt";
}

/// Full paths for the OpenAPI documentation
pub mod api_v1 {
    // Health
    pub const HEALTH: &str = "/health";
    pub const VERSION: &str = "/version";

    // Patients
    pub const PATIENTS: &str = "/api/v1/patients";
    pub const PATIENT_BY_ID: &str = "/api/v1/patients/{id}";
    pub const PATIENT_RESTORE: &str = "/api/v1/patients/{id}/restore";
    pub const PATIENT_INSURANCES: &str = "/api/v1/patients/{id}/insurances";
    pub const PATIENT_INSURANCE_BY_ID: &str = "/api/v1/patients/{id}/insurances/{insurance_id}";
    pub const PATIENT_INSURANCE_RESTORE: &str =
        "/api/v1/patients/{id}/insurances/{insurance_id}/restore";

    // Catalog
    pub const DOCTORS: &str = "/api/v1/doctors";
    pub const DOCTOR_BY_ID: &str = "/api/v1/doctors/{id}";
    pub const DOCTOR_RESTORE: &str = "/api/v1/doctors/{id}/restore";
    pub const CATEGORIES: &str = "/api/v1/service-categories";
    pub const CATEGORY_BY_ID: &str = "/api/v1/service-categories/{id}";
    pub const CATEGORY_RESTORE: &str = "/api/v1/service-categories/{id}/restore";
    pub const SERVICES: &str = "/api/v1/services";
    pub const SERVICE_BY_ID: &str = "/api/v1/services/{id}";
    pub const SERVICE_RESTORE: &str = "/api/v1/services/{id}/restore";

    // Insurance
    pub const PROVIDERS: &str = "/api/v1/insurance/providers";
    pub const PROVIDER_BY_ID: &str = "/api/v1/insurance/providers/{id}";
    pub const PROVIDER_RESTORE: &str = "/api/v1/insurance/providers/{id}/restore";
    pub const PLANS: &str = "/api/v1/insurance/plans";
    pub const PLAN_BY_ID: &str = "/api/v1/insurance/plans/{id}";
    pub const PLAN_RESTORE: &str = "/api/v1/insurance/plans/{id}/restore";
    pub const PLAN_SERVICES: &str = "/api/v1/insurance/plan-services";
    pub const PLAN_SERVICE_BY_ID: &str = "/api/v1/insurance/plan-services/{id}";
    pub const PLAN_SERVICE_RESTORE: &str = "/api/v1/insurance/plan-services/{id}/restore";
    pub const TARIFFS: &str = "/api/v1/insurance/tariffs";
    pub const TARIFF_BY_ID: &str = "/api/v1/insurance/tariffs/{id}";
    pub const TARIFF_RESTORE: &str = "/api/v1/insurance/tariffs/{id}/restore";
    pub const INSURANCE_CALCULATE: &str = "/api/v1/insurance/calculate";

    // Receptions
    pub const RECEPTIONS: &str = "/api/v1/receptions";
    pub const RECEPTION_BY_ID: &str = "/api/v1/receptions/{id}";
    pub const RECEPTION_SERVICES: &str = "/api/v1/receptions/{id}/services";
    pub const RECEPTION_SERVICE_BY_ID: &str = "/api/v1/receptions/{id}/services/{line_id}";
    pub const RECEPTION_RECALCULATE: &str = "/api/v1/receptions/{id}/recalculate";
    pub const RECEPTION_STATUS: &str = "/api/v1/receptions/{id}/status";
    pub const RECEPTION_FORM: &str = "/api/v1/receptions/{id}/form";
    pub const RECEPTION_INSURANCE_CALCULATION: &str =
        "/api/v1/receptions/{id}/insurance-calculation";

    // Payments
    pub const RECEPTION_PAYMENTS: &str = "/api/v1/receptions/{id}/payments";
    pub const RECEPTION_REFUNDS: &str = "/api/v1/receptions/{id}/refunds";
    pub const PAYMENT_RECEIPT: &str = "/api/v1/payments/{id}/receipt";
}
