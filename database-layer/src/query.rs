// List queries: paging, filtering, searching and sorting
use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::{value_of, Entity};
use crate::error::{DatabaseError, DatabaseResult};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Column types a filter value can be parsed into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Uuid,
    Text,
    Bool,
    Int,
    Decimal,
    Date,
}

impl FieldKind {
    pub fn parse(self, raw: &str) -> Result<FieldValue, String> {
        let raw = raw.trim();
        let value = match self {
            FieldKind::Uuid => FieldValue::Uuid(Some(
                Uuid::parse_str(raw).map_err(|_| format!("'{raw}' is not a UUID"))?,
            )),
            FieldKind::Text => FieldValue::Text(Some(raw.to_string())),
            FieldKind::Bool => FieldValue::Bool(Some(
                raw.parse().map_err(|_| format!("'{raw}' is not true/false"))?,
            )),
            FieldKind::Int => FieldValue::Int(Some(
                raw.parse().map_err(|_| format!("'{raw}' is not an integer"))?,
            )),
            FieldKind::Decimal => FieldValue::Decimal(Some(
                raw.parse().map_err(|_| format!("'{raw}' is not a number"))?,
            )),
            FieldKind::Date => FieldValue::Date(Some(
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map_err(|_| format!("'{raw}' is not a YYYY-MM-DD date"))?,
            )),
        };
        Ok(value)
    }
}

/// A typed column value, used for SQL binds and in-memory comparisons
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Uuid(Option<Uuid>),
    Text(Option<String>),
    Bool(Option<bool>),
    Int(Option<i32>),
    Decimal(Option<Decimal>),
    Date(Option<NaiveDate>),
    DateTime(Option<DateTime<Utc>>),
}

macro_rules! field_value_from {
    ($variant:ident, $ty:ty) => {
        impl From<$ty> for FieldValue {
            fn from(value: $ty) -> Self {
                FieldValue::$variant(Some(value))
            }
        }

        impl From<Option<$ty>> for FieldValue {
            fn from(value: Option<$ty>) -> Self {
                FieldValue::$variant(value)
            }
        }
    };
}

field_value_from!(Uuid, Uuid);
field_value_from!(Text, String);
field_value_from!(Bool, bool);
field_value_from!(Int, i32);
field_value_from!(Decimal, Decimal);
field_value_from!(Date, NaiveDate);
field_value_from!(DateTime, DateTime<Utc>);

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(Some(value.to_string()))
    }
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        match self {
            FieldValue::Uuid(v) => v.is_none(),
            FieldValue::Text(v) => v.is_none(),
            FieldValue::Bool(v) => v.is_none(),
            FieldValue::Int(v) => v.is_none(),
            FieldValue::Decimal(v) => v.is_none(),
            FieldValue::Date(v) => v.is_none(),
            FieldValue::DateTime(v) => v.is_none(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(Some(text)) => Some(text),
            _ => None,
        }
    }

    /// Ordering with NULLs last, matching `ORDER BY ... NULLS LAST`
    pub fn compare(&self, other: &FieldValue) -> Ordering {
        fn nulls_last<T: PartialOrd>(a: &Option<T>, b: &Option<T>) -> Ordering {
            match (a, b) {
                (Some(a), Some(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        }

        match (self, other) {
            (FieldValue::Uuid(a), FieldValue::Uuid(b)) => nulls_last(a, b),
            (FieldValue::Text(a), FieldValue::Text(b)) => nulls_last(a, b),
            (FieldValue::Bool(a), FieldValue::Bool(b)) => nulls_last(a, b),
            (FieldValue::Int(a), FieldValue::Int(b)) => nulls_last(a, b),
            (FieldValue::Decimal(a), FieldValue::Decimal(b)) => nulls_last(a, b),
            (FieldValue::Date(a), FieldValue::Date(b)) => nulls_last(a, b),
            (FieldValue::DateTime(a), FieldValue::DateTime(b)) => nulls_last(a, b),
            _ => Ordering::Equal,
        }
    }
}

/// Paging, filtering and sorting for repository list calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    pub page: u32,
    pub page_size: u32,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_desc: bool,
    /// Equality filters, field name to raw value
    pub filters: BTreeMap<String, String>,
    pub include_deleted: bool,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            search: None,
            sort_by: None,
            sort_desc: false,
            filters: BTreeMap::new(),
            include_deleted: false,
        }
    }
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: u32, page_size: u32) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_sort(mut self, field: impl Into<String>, desc: bool) -> Self {
        self.sort_by = Some(field.into());
        self.sort_desc = desc;
        self
    }

    pub fn with_filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }

    pub fn including_deleted(mut self, include: bool) -> Self {
        self.include_deleted = include;
        self
    }

    /// Page number, 1-based
    pub fn page(&self) -> u32 {
        self.page.max(1)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page() - 1) * u64::from(self.page_size())
    }

    /// Search term with surrounding whitespace removed; blank means no search
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Validate filters against the entity's whitelist and parse their values
    pub fn resolved_filters<T: Entity>(&self) -> DatabaseResult<Vec<(&'static str, FieldValue)>> {
        self.filters
            .iter()
            .map(|(name, raw)| {
                let (column, kind) = filter_column::<T>(name)?;
                let value = kind
                    .parse(raw)
                    .map_err(|message| DatabaseError::invalid_filter(T::RESOURCE, format!("{name}: {message}")))?;
                Ok((column, value))
            })
            .collect()
    }

    /// Sort column and direction; defaults to newest first
    pub fn resolved_sort<T: Entity>(&self) -> DatabaseResult<(&'static str, bool)> {
        match self.sort_by.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(("created_at", true)),
            Some(field) => T::SORT_FIELDS
                .iter()
                .find(|candidate| **candidate == field)
                .map(|column| (*column, self.sort_desc))
                .ok_or_else(|| DatabaseError::InvalidSort {
                    resource: T::RESOURCE,
                    field: field.to_string(),
                }),
        }
    }
}

/// Look up a whitelisted filter column (`id` is always allowed)
pub(crate) fn filter_column<T: Entity>(name: &str) -> DatabaseResult<(&'static str, FieldKind)> {
    if name == "id" {
        return Ok(("id", FieldKind::Uuid));
    }
    T::FILTER_FIELDS
        .iter()
        .find(|(column, _)| *column == name)
        .copied()
        .ok_or_else(|| DatabaseError::invalid_filter(T::RESOURCE, format!("unknown field '{name}'")))
}

/// Case-insensitive substring match over the entity's search fields
pub(crate) fn matches_search<T: Entity>(entity: &T, term: &str) -> bool {
    let needle = term.to_lowercase();
    T::SEARCH_FIELDS.iter().any(|field| {
        value_of(entity, field)
            .as_ref()
            .and_then(FieldValue::as_text)
            .map(|text| text.to_lowercase().contains(&needle))
            .unwrap_or(false)
    })
}

/// Escape `%`, `_` and `\` for use inside an ILIKE pattern
pub(crate) fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// One page of results plus the total matching count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, query: &ListQuery) -> Self {
        Self {
            items,
            total,
            page: query.page(),
            page_size: query.page_size(),
        }
    }

    pub fn total_pages(&self) -> u32 {
        if self.total == 0 || self.page_size == 0 {
            return 1;
        }
        let pages = self.total.div_ceil(u64::from(self.page_size));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_clamping() {
        let query = ListQuery::new().with_page(0, 500);
        assert_eq!(query.page(), 1);
        assert_eq!(query.page_size(), MAX_PAGE_SIZE);
        assert_eq!(query.offset(), 0);

        let query = ListQuery::new().with_page(3, 0);
        assert_eq!(query.page_size(), 1);
        assert_eq!(query.offset(), 2);
    }

    #[test]
    fn test_page_counts() {
        let query = ListQuery::new().with_page(2, 10);
        let page: Page<u8> = Page::new(vec![], 25, &query);
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_next());
        assert!(page.has_previous());

        let empty: Page<u8> = Page::new(vec![], 0, &ListQuery::new());
        assert_eq!(empty.total_pages(), 1);
        assert!(!empty.has_next());
        assert!(!empty.has_previous());
    }

    #[test]
    fn test_blank_search_is_ignored() {
        assert_eq!(ListQuery::new().with_search("   ").search_term(), None);
        assert_eq!(ListQuery::new().with_search(" رضا ").search_term(), Some("رضا"));
    }

    #[test]
    fn test_filter_value_parsing() {
        assert_eq!(FieldKind::Bool.parse("true"), Ok(FieldValue::Bool(Some(true))));
        assert!(FieldKind::Uuid.parse("not-a-uuid").is_err());
        assert_eq!(
            FieldKind::Date.parse("2024-04-03"),
            Ok(FieldValue::Date(NaiveDate::from_ymd_opt(2024, 4, 3)))
        );
    }

    #[test]
    fn test_nulls_sort_last() {
        let some = FieldValue::Text(Some("b".into()));
        let none = FieldValue::Text(None);
        assert_eq!(some.compare(&none), Ordering::Less);
        assert_eq!(none.compare(&some), Ordering::Greater);
        assert_eq!(FieldValue::from("a").compare(&some), Ordering::Less);
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
