// In-memory repository backend, for development and tests
use std::cmp::Ordering;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::audit::AuditInfo;
use crate::entity::{value_of, Entity};
use crate::error::{DatabaseError, DatabaseResult};
use crate::query::{filter_column, matches_search, FieldValue, ListQuery, Page};
use crate::repository::Repository;

/// `DashMap`-backed repository with the same semantics as [`PgRepository`](crate::PgRepository)
#[derive(Clone)]
pub struct InMemoryRepository<T: Entity> {
    rows: Arc<DashMap<Uuid, T>>,
    /// Serialises writes so unique keys are checked and stored atomically
    writes: Arc<Mutex<()>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Entity> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            rows: Arc::new(DashMap::new()),
            writes: Arc::new(Mutex::new(())),
            _marker: PhantomData,
        }
    }

    /// Reject `candidate` when another row already holds one of its unique keys
    ///
    /// Callers hold the write lock and no map guard.
    fn check_unique(&self, candidate: &T) -> DatabaseResult<()> {
        for key in T::UNIQUE_KEYS {
            if key.live_only && !candidate.audit().is_live() {
                continue;
            }
            let values: Vec<Option<FieldValue>> = key
                .columns
                .iter()
                .map(|column| value_of(candidate, column))
                .collect();
            // NULLs never collide in a unique index
            if values.iter().any(|v| v.as_ref().map_or(true, FieldValue::is_null)) {
                continue;
            }

            let taken = self.rows.iter().any(|entry| {
                let row = entry.value();
                row.id() != candidate.id()
                    && (!key.live_only || row.audit().is_live())
                    && key
                        .columns
                        .iter()
                        .zip(&values)
                        .all(|(column, value)| &value_of(row, column) == value)
            });
            if taken {
                return Err(DatabaseError::conflict(
                    T::RESOURCE,
                    format!("{} already taken", key.columns.join(", ")),
                ));
            }
        }
        Ok(())
    }

    /// Matching rows sorted by the query's sort column, ties by id
    fn select(&self, query: &ListQuery) -> DatabaseResult<Vec<T>> {
        let filters = query.resolved_filters::<T>()?;
        let (sort_column, desc) = query.resolved_sort::<T>()?;
        let search = query.search_term();

        let mut rows: Vec<T> = self
            .rows
            .iter()
            .map(|entry| entry.value().clone())
            .filter(|row| query.include_deleted || row.audit().is_live())
            .filter(|row| {
                filters
                    .iter()
                    .all(|(column, value)| value_of(row, column).as_ref() == Some(value))
            })
            .filter(|row| search.map_or(true, |term| matches_search(row, term)))
            .collect();

        rows.sort_by(|a, b| {
            let left = value_of(a, sort_column);
            let right = value_of(b, sort_column);
            let ordering = match (&left, &right) {
                (Some(l), Some(r)) if !l.is_null() && !r.is_null() => {
                    let ordering = l.compare(r);
                    if desc {
                        ordering.reverse()
                    } else {
                        ordering
                    }
                }
                // NULLs last in both directions
                (Some(l), Some(r)) => l.compare(r),
                _ => Ordering::Equal,
            };
            ordering.then_with(|| a.id().cmp(&b.id()))
        });

        Ok(rows)
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for InMemoryRepository<T> {
    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<T>> {
        Ok(self
            .rows
            .get(&id)
            .map(|row| row.value().clone())
            .filter(|row| row.audit().is_live()))
    }

    async fn find_including_deleted(&self, id: Uuid) -> DatabaseResult<Option<T>> {
        Ok(self.rows.get(&id).map(|row| row.value().clone()))
    }

    async fn list(&self, query: &ListQuery) -> DatabaseResult<Page<T>> {
        let rows = self.select(query)?;
        let total = rows.len() as u64;
        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let limit = query.page_size() as usize;
        let items = rows.into_iter().skip(offset).take(limit).collect();
        Ok(Page::new(items, total, query))
    }

    async fn find_by(&self, field: &str, value: FieldValue) -> DatabaseResult<Vec<T>> {
        let (column, _) = filter_column::<T>(field)?;
        let mut rows: Vec<T> = self
            .rows
            .iter()
            .map(|entry| entry.value().clone())
            .filter(|row| row.audit().is_live() && value_of(row, column).as_ref() == Some(&value))
            .collect();
        rows.sort_by(|a, b| {
            a.audit()
                .created_at
                .cmp(&b.audit().created_at)
                .then_with(|| a.id().cmp(&b.id()))
        });
        Ok(rows)
    }

    async fn count(&self, query: &ListQuery) -> DatabaseResult<u64> {
        Ok(self.select(query)?.len() as u64)
    }

    async fn insert(&self, mut entity: T, actor: Option<Uuid>) -> DatabaseResult<T> {
        let id = entity.id();
        entity.audit_mut().stamp_created(actor, Utc::now());

        let _guard = self.writes.lock().await;
        if self.rows.contains_key(&id) {
            return Err(DatabaseError::conflict(T::RESOURCE, format!("{id} already exists")));
        }
        self.check_unique(&entity)?;
        self.rows.insert(id, entity.clone());
        debug!(resource = T::RESOURCE, %id, "Inserted");
        Ok(entity)
    }

    async fn update(&self, mut entity: T, actor: Option<Uuid>) -> DatabaseResult<T> {
        let id = entity.id();
        let _guard = self.writes.lock().await;
        let previous = self
            .rows
            .get(&id)
            .map(|row| row.audit().clone())
            .filter(AuditInfo::is_live)
            .ok_or_else(|| DatabaseError::not_found(T::RESOURCE, id))?;

        let audit = entity.audit_mut();
        *audit = previous;
        audit.stamp_updated(actor, Utc::now());

        self.check_unique(&entity)?;
        self.rows.insert(id, entity.clone());
        debug!(resource = T::RESOURCE, %id, "Updated");
        Ok(entity)
    }

    async fn soft_delete(&self, id: Uuid, actor: Option<Uuid>) -> DatabaseResult<T> {
        let mut stored = self
            .rows
            .get_mut(&id)
            .filter(|row| row.audit().is_live())
            .ok_or_else(|| DatabaseError::not_found(T::RESOURCE, id))?;

        stored.audit_mut().mark_deleted(actor, Utc::now());
        debug!(resource = T::RESOURCE, %id, "Soft deleted");
        Ok(stored.clone())
    }

    async fn restore(&self, id: Uuid, actor: Option<Uuid>) -> DatabaseResult<T> {
        let _guard = self.writes.lock().await;
        let mut stored = self
            .rows
            .get(&id)
            .map(|row| row.value().clone())
            .ok_or_else(|| DatabaseError::not_found(T::RESOURCE, id))?;

        if stored.audit().is_deleted {
            stored.audit_mut().restore(actor, Utc::now());
            self.check_unique(&stored)?;
            self.rows.insert(id, stored.clone());
            debug!(resource = T::RESOURCE, %id, "Restored");
        }
        Ok(stored)
    }
}
