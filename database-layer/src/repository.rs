// Repository abstraction shared by the Postgres and in-memory backends
use async_trait::async_trait;
use uuid::Uuid;

use crate::entity::Entity;
use crate::error::{DatabaseError, DatabaseResult};
use crate::query::{FieldValue, ListQuery, Page};

/// Insert attempts allowed when a sequential number is taken by a concurrent writer
pub const NUMBERING_ATTEMPTS: u32 = 100;

/// CRUD with soft delete and audit stamping for one entity type
///
/// Reads skip soft-deleted rows unless stated otherwise. Writes stamp the
/// row's [`AuditInfo`](crate::AuditInfo) with `actor` and the current time.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<T>>;

    async fn find_including_deleted(&self, id: Uuid) -> DatabaseResult<Option<T>>;

    async fn list(&self, query: &ListQuery) -> DatabaseResult<Page<T>>;

    /// All live rows whose `field` equals `value`, oldest first
    async fn find_by(&self, field: &str, value: FieldValue) -> DatabaseResult<Vec<T>>;

    async fn count(&self, query: &ListQuery) -> DatabaseResult<u64>;

    /// Store a new row; an existing id or a taken unique key is a conflict
    async fn insert(&self, entity: T, actor: Option<Uuid>) -> DatabaseResult<T>;

    /// Replace a live row, keeping its creation stamp
    async fn update(&self, entity: T, actor: Option<Uuid>) -> DatabaseResult<T>;

    async fn soft_delete(&self, id: Uuid, actor: Option<Uuid>) -> DatabaseResult<T>;

    /// Undo a soft delete; restoring a live row returns it unchanged
    async fn restore(&self, id: Uuid, actor: Option<Uuid>) -> DatabaseResult<T>;

    /// Live row or `NotFound`
    async fn get(&self, id: Uuid) -> DatabaseResult<T> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DatabaseError::not_found(T::RESOURCE, id))
    }

    /// Row in any state, for records that point at since-deleted rows
    async fn get_including_deleted(&self, id: Uuid) -> DatabaseResult<T> {
        self.find_including_deleted(id)
            .await?
            .ok_or_else(|| DatabaseError::not_found(T::RESOURCE, id))
    }
}
