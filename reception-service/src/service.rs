use billing_service::BillingService;
use database_layer::Repositories;
use insurance_service::InsuranceService;

use crate::error::{ReceptionError, ReceptionResult};

/// Front desk operations: registry, catalogue and the reception workflow
///
/// Coverage and payments are delegated to [`InsuranceService`] and
/// [`BillingService`], which share the same repositories.
#[derive(Clone)]
pub struct ReceptionService {
    repos: Repositories,
    insurance: InsuranceService,
    billing: BillingService,
}

impl ReceptionService {
    pub fn new(repos: Repositories) -> Self {
        Self {
            insurance: InsuranceService::new(repos.clone()),
            billing: BillingService::new(repos.clone()),
            repos,
        }
    }

    pub fn repos(&self) -> &Repositories {
        &self.repos
    }

    pub fn insurance(&self) -> &InsuranceService {
        &self.insurance
    }

    pub fn billing(&self) -> &BillingService {
        &self.billing
    }
}

pub(crate) fn required(field: &str, value: &str) -> ReceptionResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ReceptionError::Validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

/// Trimmed text, `None` when blank
pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_helpers() {
        assert_eq!(required("name", "  Sara ").unwrap(), "Sara");
        assert!(matches!(required("name", "   "), Err(ReceptionError::Validation(_))));
        assert_eq!(optional(Some("  ".to_string())), None);
        assert_eq!(optional(Some(" x ".to_string())).as_deref(), Some("x"));
        assert_eq!(optional(None), None);
    }
}
