pub mod redactor;
pub mod macros;
pub mod config;
pub mod subscriber;

pub use redactor::*;
pub use config::*;
pub use subscriber::*;

/// Logging with automatic PII redaction
///
/// Patient data in a clinic (national codes, mobile numbers, card numbers
/// used at the POS, email addresses) must never reach log files in clear
/// text. Every line the subscriber writes goes through [`PiiRedactor`]
/// before it hits stdout, and code that logs free text can call
/// [`redact`] or the `redacted_*!` macros explicitly.
///
/// # Detected Data Types
///
/// - **Email Addresses**: user@example.com → u***@e***
/// - **Mobile Numbers**: 09121234567 / +989121234567 → 09*********
/// - **National Codes**: 0499370899 → **********
/// - **Card Numbers**: 6037-9975-1234-5678 → ****-****-****-5678
///
/// With `hash_for_correlation` enabled the mask is replaced by a short
/// SHA-256 prefix (`NID[3q2+7w==...]`) so the same patient can be followed
/// through the logs without exposing the value.
///
/// # Example
///
/// ```rust,no_run
/// use logger_redacted::{init_tracing, LoggerConfig};
///
/// init_tracing(&LoggerConfig::default()).expect("subscriber");
/// logger_redacted::redacted_info!("patient {} registered", "0499370899");
/// ```
pub fn redact(text: &str) -> String {
    DEFAULT_REDACTOR.redact(text)
}

lazy_static::lazy_static! {
    static ref DEFAULT_REDACTOR: PiiRedactor = PiiRedactor::default();
}
