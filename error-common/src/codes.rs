// Standardized error codes for the clinic engine

pub mod validation {
    pub const INVALID_INPUT: &str = "VALIDATION_1001";
}

pub mod database {
    pub const CONNECTION_FAILED: &str = "DB_4001";
    pub const QUERY_FAILED: &str = "DB_4002";
    pub const CONSTRAINT_VIOLATION: &str = "DB_4003";
    pub const NOT_FOUND: &str = "DB_4004";
}

pub mod business {
    pub const RULE_VIOLATION: &str = "BUSINESS_5001";
    pub const INVALID_TRANSITION: &str = "BUSINESS_5002";
    pub const INVALID_COVERAGE: &str = "BUSINESS_5003";
    pub const PAYMENT_REJECTED: &str = "BUSINESS_5004";
}

pub mod system {
    pub const INTERNAL: &str = "SYS_9001";
    pub const CONFIGURATION: &str = "SYS_9002";
    pub const UNAVAILABLE: &str = "SYS_9003";
}
