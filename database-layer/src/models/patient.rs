use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::Gender;
use crate::audit::AuditInfo;
use crate::entity::{Entity, UniqueKey};
use crate::query::{FieldKind, FieldValue};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Patient {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub father_name: Option<String>,
    /// 10-digit national identification code
    pub national_code: String,
    /// Clinic file number, assigned on registration
    pub file_number: String,
    pub birth_date: Option<NaiveDate>,
    #[sqlx(try_from = "String")]
    pub gender: Gender,
    pub mobile: Option<String>,
    pub address: Option<String>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditInfo,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    /// Age in whole years on `date`, if the birth date is known
    pub fn age_on(&self, date: NaiveDate) -> Option<u32> {
        let birth = self.birth_date?;
        let mut years = date.year() - birth.year();
        if (date.month(), date.day()) < (birth.month(), birth.day()) {
            years -= 1;
        }
        u32::try_from(years).ok()
    }
}

impl Entity for Patient {
    const TABLE: &'static str = "patients";
    const RESOURCE: &'static str = "patient";
    const COLUMNS: &'static [&'static str] = &[
        "first_name",
        "last_name",
        "father_name",
        "national_code",
        "file_number",
        "birth_date",
        "gender",
        "mobile",
        "address",
    ];
    const SEARCH_FIELDS: &'static [&'static str] =
        &["first_name", "last_name", "national_code", "file_number", "mobile"];
    const FILTER_FIELDS: &'static [(&'static str, FieldKind)] = &[
        ("national_code", FieldKind::Text),
        ("file_number", FieldKind::Text),
        ("gender", FieldKind::Text),
        ("mobile", FieldKind::Text),
    ];
    const SORT_FIELDS: &'static [&'static str] = &[
        "created_at",
        "updated_at",
        "first_name",
        "last_name",
        "file_number",
        "birth_date",
    ];
    const UNIQUE_KEYS: &'static [UniqueKey] = &[
        UniqueKey::always(&["file_number"]),
        UniqueKey::live(&["national_code"]),
    ];

    fn id(&self) -> Uuid {
        self.id
    }

    fn audit(&self) -> &AuditInfo {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "first_name" => self.first_name.clone().into(),
            "last_name" => self.last_name.clone().into(),
            "father_name" => self.father_name.clone().into(),
            "national_code" => self.national_code.clone().into(),
            "file_number" => self.file_number.clone().into(),
            "birth_date" => self.birth_date.into(),
            "gender" => self.gender.into(),
            "mobile" => self.mobile.clone().into(),
            "address" => self.address.clone().into(),
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient(birth_date: Option<NaiveDate>) -> Patient {
        Patient {
            id: Uuid::new_v4(),
            first_name: "Sara".to_string(),
            last_name: "Ahmadi ".to_string(),
            father_name: None,
            national_code: "0499370899".to_string(),
            file_number: "000001".to_string(),
            birth_date,
            gender: Gender::Female,
            mobile: None,
            address: None,
            audit: AuditInfo::default(),
        }
    }

    #[test]
    fn test_full_name() {
        assert_eq!(patient(None).full_name(), "Sara Ahmadi");
    }

    #[test]
    fn test_age_before_and_after_birthday() {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
        let p = patient(Some(date(1990, 6, 15)));
        assert_eq!(p.age_on(date(2024, 6, 14)), Some(33));
        assert_eq!(p.age_on(date(2024, 6, 15)), Some(34));
        assert_eq!(patient(None).age_on(date(2024, 1, 1)), None);
    }

    #[test]
    fn test_every_column_has_a_value() {
        let p = patient(None);
        for column in Patient::COLUMNS {
            assert!(p.field(column).is_some(), "missing {column}");
        }
    }
}
