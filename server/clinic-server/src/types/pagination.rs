//! Pagination, search and filter parameters shared by every list endpoint

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use config_engine::PaginationSettings;
use database_layer::{ListQuery, Page};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::{api_success_with_meta, ApiError, ApiResponse, PaginationInfo, ResponseMetadata};

/// Query parameters understood by all list endpoints
///
/// Any other query key is an equality filter on a field of the listed
/// record, e.g. `?status=registered&doctor_id=...` on receptions.
#[derive(Debug, Default, Deserialize, IntoParams, Clone, PartialEq, Eq)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    #[param(example = 1, minimum = 1)]
    pub page: Option<u32>,

    #[param(example = 20, minimum = 1, maximum = 100)]
    pub page_size: Option<u32>,

    /// Case-insensitive substring match over the record's search fields
    pub search: Option<String>,

    #[param(example = "created_at")]
    pub sort_by: Option<String>,

    pub sort_desc: Option<bool>,

    /// Also return soft-deleted records
    pub include_deleted: Option<bool>,
}

const RESERVED_KEYS: &[&str] = &[
    "page",
    "page_size",
    "search",
    "sort_by",
    "sort_desc",
    "include_deleted",
];

fn parse_param<T: FromStr>(
    raw: &HashMap<String, String>,
    key: &str,
    expected: &str,
) -> Result<Option<T>, ApiError> {
    raw.get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(|value| {
            value
                .parse::<T>()
                .map_err(|_| ApiError::invalid_field(key, format!("must be {expected}")))
        })
        .transpose()
}

impl ListParams {
    /// Split a raw query string map into list parameters and filters
    pub fn parse(
        raw: &HashMap<String, String>,
    ) -> Result<(Self, BTreeMap<String, String>), ApiError> {
        let params = Self {
            page: parse_param(raw, "page", "a positive integer")?,
            page_size: parse_param(raw, "page_size", "a positive integer")?,
            search: raw.get("search").cloned(),
            sort_by: raw.get("sort_by").cloned(),
            sort_desc: parse_param(raw, "sort_desc", "true or false")?,
            include_deleted: parse_param(raw, "include_deleted", "true or false")?,
        };
        let filters = raw
            .iter()
            .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Ok((params, filters))
    }

    /// Get the page number (defaults to 1, minimum 1)
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Get the page size (configured default, clamped to the configured maximum)
    pub fn page_size(&self, settings: &PaginationSettings) -> u32 {
        let max = settings.max_page_size.max(1);
        self.page_size
            .unwrap_or(settings.default_page_size)
            .clamp(1, max)
    }

    pub fn to_query(
        &self,
        filters: BTreeMap<String, String>,
        settings: &PaginationSettings,
    ) -> ListQuery {
        let mut query = ListQuery::new()
            .with_page(self.page(), self.page_size(settings))
            .including_deleted(self.include_deleted.unwrap_or(false));
        if let Some(search) = &self.search {
            query = query.with_search(search.clone());
        }
        if let Some(sort_by) = &self.sort_by {
            query = query.with_sort(sort_by.clone(), self.sort_desc.unwrap_or(false));
        }
        query.filters = filters;
        query
    }
}

/// Repository query for a list request
pub fn list_query(
    raw: &HashMap<String, String>,
    settings: &PaginationSettings,
) -> Result<ListQuery, ApiError> {
    let (params, filters) = ListParams::parse(raw)?;
    Ok(params.to_query(filters, settings))
}

/// Create response metadata with pagination info
pub fn to_metadata<T>(page: &Page<T>) -> ResponseMetadata {
    ResponseMetadata {
        pagination: Some(PaginationInfo {
            page: page.page,
            page_size: page.page_size,
            total_pages: page.total_pages(),
            has_next: page.has_next(),
            has_previous: page.has_previous(),
        }),
        total_count: Some(page.total),
    }
}

/// Wrap a page of records with pagination metadata
pub fn paginated<T>(page: Page<T>) -> ApiResponse<Vec<T>> {
    let metadata = to_metadata(&page);
    api_success_with_meta(page.items, metadata)
}
