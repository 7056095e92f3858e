// Table metadata shared by the Postgres and in-memory repositories
use sqlx::{postgres::PgRow, FromRow};
use uuid::Uuid;

use crate::audit::AuditInfo;
use crate::query::{FieldKind, FieldValue};

/// Audit columns present on every table, in insert order
pub const AUDIT_COLUMNS: &[&str] = &[
    "created_at",
    "created_by",
    "updated_at",
    "updated_by",
    "is_deleted",
    "deleted_at",
    "deleted_by",
];

/// Columns whose values may not repeat, mirroring a unique index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniqueKey {
    pub columns: &'static [&'static str],
    /// Partial index over rows with `is_deleted = false`
    pub live_only: bool,
}

impl UniqueKey {
    /// Unique across every row, deleted ones included
    pub const fn always(columns: &'static [&'static str]) -> Self {
        Self {
            columns,
            live_only: false,
        }
    }

    /// Unique among live rows
    pub const fn live(columns: &'static [&'static str]) -> Self {
        Self {
            columns,
            live_only: true,
        }
    }
}

/// A row type stored in its own table with an embedded [`AuditInfo`]
///
/// The column lists are whitelists: only names listed here ever reach SQL
/// text, everything else is bound as a parameter.
pub trait Entity: Clone + Send + Sync + Unpin + 'static + for<'r> FromRow<'r, PgRow> {
    const TABLE: &'static str;
    /// Singular name used in errors and logs
    const RESOURCE: &'static str;
    /// Data columns other than `id` and the audit columns
    const COLUMNS: &'static [&'static str];
    const SEARCH_FIELDS: &'static [&'static str];
    const FILTER_FIELDS: &'static [(&'static str, FieldKind)];
    const SORT_FIELDS: &'static [&'static str];
    /// Unique indexes of the table; the in-memory backend enforces the same set
    const UNIQUE_KEYS: &'static [UniqueKey] = &[];

    fn id(&self) -> Uuid;
    fn audit(&self) -> &AuditInfo;
    fn audit_mut(&mut self) -> &mut AuditInfo;

    /// Value of one of [`Entity::COLUMNS`]
    fn field(&self, name: &str) -> Option<FieldValue>;
}

/// Value of any column, including `id` and the audit columns
pub fn value_of<T: Entity>(entity: &T, name: &str) -> Option<FieldValue> {
    let audit = entity.audit();
    let value = match name {
        "id" => FieldValue::from(entity.id()),
        "created_at" => audit.created_at.into(),
        "created_by" => audit.created_by.into(),
        "updated_at" => audit.updated_at.into(),
        "updated_by" => audit.updated_by.into(),
        "is_deleted" => audit.is_deleted.into(),
        "deleted_at" => audit.deleted_at.into(),
        "deleted_by" => audit.deleted_by.into(),
        other => return entity.field(other),
    };
    Some(value)
}

/// Every column of `T` in insert order
pub fn all_columns<T: Entity>() -> impl Iterator<Item = &'static str> {
    std::iter::once("id")
        .chain(T::COLUMNS.iter().copied())
        .chain(AUDIT_COLUMNS.iter().copied())
}
