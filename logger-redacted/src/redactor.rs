use base64::{engine::general_purpose, Engine as _};
use regex::Regex;
use sha2::{Digest, Sha256};

// Literal patterns, covered by the tests below
#[allow(clippy::unwrap_used)]
mod patterns {
    use lazy_static::lazy_static;
    use regex::Regex;

    lazy_static! {
        pub static ref EMAIL_REGEX: Regex =
            Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap();
        // Iranian mobile numbers: 09xxxxxxxxx, +989xxxxxxxxx, 00989xxxxxxxxx
        pub static ref MOBILE_REGEX: Regex =
            Regex::new(r"(?:\+98|0098|\b0)9\d{2}[-\s]?\d{3}[-\s]?\d{4}\b").unwrap();
        // 10-digit national code (کد ملی), optionally written 3-6-1
        pub static ref NATIONAL_CODE_REGEX: Regex =
            Regex::new(r"\b\d{3}-?\d{6}-?\d\b").unwrap();
        pub static ref CARD_REGEX: Regex =
            Regex::new(r"\b\d{4}[-\s]?\d{4}[-\s]?\d{4}[-\s]?\d{4}\b").unwrap();
    }
}

use patterns::{CARD_REGEX, EMAIL_REGEX, MOBILE_REGEX, NATIONAL_CODE_REGEX};

/// PII redaction configuration
#[derive(Debug, Clone)]
pub struct RedactionConfig {
    pub redact_emails: bool,
    pub redact_mobiles: bool,
    pub redact_national_codes: bool,
    pub redact_card_numbers: bool,
    pub hash_for_correlation: bool,
    pub custom_patterns: Vec<(Regex, String)>,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            redact_emails: true,
            redact_mobiles: true,
            redact_national_codes: true,
            redact_card_numbers: true,
            hash_for_correlation: true,
            custom_patterns: Vec::new(),
        }
    }
}

impl RedactionConfig {
    pub fn with_hash_for_correlation(mut self, enabled: bool) -> Self {
        self.hash_for_correlation = enabled;
        self
    }

    pub fn with_custom_pattern(mut self, pattern: Regex, replacement: impl Into<String>) -> Self {
        self.custom_patterns.push((pattern, replacement.into()));
        self
    }
}

/// PII redactor for log messages
#[derive(Debug, Clone, Default)]
pub struct PiiRedactor {
    config: RedactionConfig,
}

impl PiiRedactor {
    pub fn new(config: RedactionConfig) -> Self {
        Self { config }
    }

    pub fn redact(&self, text: &str) -> String {
        let mut result = text.to_string();

        // Cards before national codes: a 16-digit card must not be split into a 10-digit match.
        if self.config.redact_card_numbers {
            result = self.replace(&CARD_REGEX, &result, "CARD", |card| {
                let digits: String = card.chars().filter(char::is_ascii_digit).collect();
                let tail = digits.get(digits.len().saturating_sub(4)..).unwrap_or_default();
                format!("****-****-****-{tail}")
            });
        }

        if self.config.redact_emails {
            result = self.replace(&EMAIL_REGEX, &result, "EMAIL", |email| {
                match email.split_once('@') {
                    Some((user, domain)) => format!(
                        "{}***@{}***",
                        user.chars().next().unwrap_or('*'),
                        domain.chars().next().unwrap_or('*')
                    ),
                    None => "***@***".to_string(),
                }
            });
        }

        if self.config.redact_mobiles {
            result = self.replace(&MOBILE_REGEX, &result, "MOBILE", |_| "09*********".to_string());
        }

        if self.config.redact_national_codes {
            result = self.replace(&NATIONAL_CODE_REGEX, &result, "NID", |_| "**********".to_string());
        }

        for (pattern, replacement) in &self.config.custom_patterns {
            result = pattern.replace_all(&result, replacement.as_str()).to_string();
        }

        result
    }

    fn replace<F>(&self, pattern: &Regex, text: &str, label: &str, mask: F) -> String
    where
        F: Fn(&str) -> String,
    {
        pattern
            .replace_all(text, |caps: &regex::Captures| {
                let value = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
                if self.config.hash_for_correlation {
                    format!("{label}[{}]", hash_value(value))
                } else {
                    mask(value)
                }
            })
            .to_string()
    }
}

/// Short, stable hash so redacted values can still be correlated across log lines
pub fn hash_value(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let result = hasher.finalize();
    general_purpose::STANDARD.encode(&result[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn masking() -> PiiRedactor {
        PiiRedactor::new(RedactionConfig::default().with_hash_for_correlation(false))
    }

    #[test]
    fn test_email_redaction() {
        let redacted = masking().redact("Receipt sent to sara.ahmadi@example.com");
        assert!(redacted.contains("s***@e***"));
        assert!(!redacted.contains("sara.ahmadi"));
    }

    #[test]
    fn test_mobile_redaction() {
        let redacted = masking().redact("patient mobile 09121234567 and +989351112233");
        assert_eq!(redacted, "patient mobile 09********* and 09*********");
    }

    #[test]
    fn test_national_code_redaction() {
        let redacted = masking().redact("national code 0499370899 registered");
        assert_eq!(redacted, "national code ********** registered");
    }

    #[test]
    fn test_card_redaction_keeps_last_four() {
        let redacted = masking().redact("paid with 6037-9975-1234-5678");
        assert_eq!(redacted, "paid with ****-****-****-5678");
    }

    #[test]
    fn test_hash_correlation_is_stable() {
        let redactor = PiiRedactor::default();
        let first = redactor.redact("nid 0499370899");
        let second = redactor.redact("nid 0499370899");
        assert_eq!(first, second);
        assert!(first.starts_with("nid NID["));
    }

    #[test]
    fn test_uuids_are_left_alone() {
        let text = "reception 2f1c6a1e-93b2-4d8e-9a51-123456789012 created";
        assert_eq!(masking().redact(text), text);
    }

    #[test]
    fn test_custom_pattern() {
        let redactor = PiiRedactor::new(
            RedactionConfig::default()
                .with_custom_pattern(Regex::new(r"FILE-\d+").unwrap(), "FILE-[REDACTED]"),
        );
        assert_eq!(redactor.redact("opened FILE-000123"), "opened FILE-[REDACTED]");
    }
}
