// PostgreSQL repository backend
use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use crate::entity::{all_columns, value_of, Entity};
use crate::error::{DatabaseError, DatabaseResult};
use crate::query::{filter_column, like_pattern, FieldValue, ListQuery, Page};
use crate::repository::Repository;

/// Generic repository over one table
///
/// SQL text only ever contains names from the entity's whitelists; every
/// value is bound.
#[derive(Clone)]
pub struct PgRepository<T: Entity> {
    pool: PgPool,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Entity> PgRepository<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// `WHERE` clause shared by `list` and `count`
    fn push_conditions(builder: &mut QueryBuilder<'_, Postgres>, query: &ListQuery) -> DatabaseResult<()> {
        builder.push(" WHERE 1 = 1");

        if !query.include_deleted {
            builder.push(" AND is_deleted = false");
        }

        for (column, value) in query.resolved_filters::<T>()? {
            builder.push(format_args!(" AND {column} = "));
            push_value(builder, value);
        }

        if let Some(term) = query.search_term() {
            if !T::SEARCH_FIELDS.is_empty() {
                let pattern = like_pattern(term);
                builder.push(" AND (");
                for (i, column) in T::SEARCH_FIELDS.iter().enumerate() {
                    if i > 0 {
                        builder.push(" OR ");
                    }
                    builder.push(format_args!("{column} ILIKE "));
                    builder.push_bind(pattern.clone());
                }
                builder.push(")");
            } else {
                builder.push(" AND false");
            }
        }

        Ok(())
    }

    /// One page of `query`, ordered with a stable tie-break on id
    fn list_statement(query: &ListQuery) -> DatabaseResult<QueryBuilder<'static, Postgres>> {
        let (sort_column, desc) = query.resolved_sort::<T>()?;

        let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT * FROM {}", T::TABLE));
        Self::push_conditions(&mut builder, query)?;
        builder.push(format_args!(
            " ORDER BY {sort_column} {} NULLS LAST, id ASC",
            if desc { "DESC" } else { "ASC" }
        ));
        builder.push(" LIMIT ");
        builder.push_bind(i64::from(query.page_size()));
        builder.push(" OFFSET ");
        builder.push_bind(i64::try_from(query.offset()).unwrap_or(i64::MAX));
        Ok(builder)
    }

    /// Rewrite every data column of a live row plus its update stamp
    fn update_statement(entity: &T) -> DatabaseResult<QueryBuilder<'static, Postgres>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!("UPDATE {} SET ", T::TABLE));
        for column in T::COLUMNS {
            let value = entity.field(column).ok_or_else(|| {
                DatabaseError::QueryFailed(format!("{} has no value for column {column}", T::RESOURCE))
            })?;
            builder.push(format_args!("{column} = "));
            push_value(&mut builder, value);
            builder.push(", ");
        }
        builder.push("updated_at = ");
        builder.push_bind(entity.audit().updated_at);
        builder.push(", updated_by = ");
        builder.push_bind(entity.audit().updated_by);
        builder.push(" WHERE id = ");
        builder.push_bind(entity.id());
        builder.push(" AND is_deleted = false RETURNING *");
        Ok(builder)
    }
}

/// Bind a typed value, keeping the SQL type of NULLs
fn push_value(builder: &mut QueryBuilder<'_, Postgres>, value: FieldValue) {
    match value {
        FieldValue::Uuid(v) => builder.push_bind(v),
        FieldValue::Text(v) => builder.push_bind(v),
        FieldValue::Bool(v) => builder.push_bind(v),
        FieldValue::Int(v) => builder.push_bind(v),
        FieldValue::Decimal(v) => builder.push_bind(v),
        FieldValue::Date(v) => builder.push_bind(v),
        FieldValue::DateTime(v) => builder.push_bind(v),
    };
}

#[async_trait]
impl<T: Entity> Repository<T> for PgRepository<T> {
    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<T>> {
        let sql = format!("SELECT * FROM {} WHERE id = $1 AND is_deleted = false", T::TABLE);
        let row = sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_including_deleted(&self, id: Uuid) -> DatabaseResult<Option<T>> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", T::TABLE);
        let row = sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list(&self, query: &ListQuery) -> DatabaseResult<Page<T>> {
        let total = self.count(query).await?;
        let mut builder = Self::list_statement(query)?;

        debug!(resource = T::RESOURCE, sql = builder.sql(), "Listing");
        let items = builder.build_query_as::<T>().fetch_all(&self.pool).await?;
        Ok(Page::new(items, total, query))
    }

    async fn find_by(&self, field: &str, value: FieldValue) -> DatabaseResult<Vec<T>> {
        let (column, _) = filter_column::<T>(field)?;
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT * FROM {} WHERE is_deleted = false AND {column} = ",
            T::TABLE
        ));
        push_value(&mut builder, value);
        builder.push(" ORDER BY created_at ASC, id ASC");

        let rows = builder.build_query_as::<T>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn count(&self, query: &ListQuery) -> DatabaseResult<u64> {
        let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) FROM {}", T::TABLE));
        Self::push_conditions(&mut builder, query)?;
        let total: i64 = builder.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(u64::try_from(total).unwrap_or(0))
    }

    async fn insert(&self, mut entity: T, actor: Option<Uuid>) -> DatabaseResult<T> {
        entity.audit_mut().stamp_created(actor, Utc::now());

        let columns: Vec<&'static str> = all_columns::<T>().collect();
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "INSERT INTO {} ({}) VALUES (",
            T::TABLE,
            columns.join(", ")
        ));
        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            let value = value_of(&entity, column).ok_or_else(|| {
                DatabaseError::QueryFailed(format!("{} has no value for column {column}", T::RESOURCE))
            })?;
            push_value(&mut builder, value);
        }
        builder.push(") RETURNING *");

        let stored = builder
            .build_query_as::<T>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_write(T::RESOURCE, e))?;
        debug!(resource = T::RESOURCE, id = %stored.id(), "Inserted");
        Ok(stored)
    }

    async fn update(&self, mut entity: T, actor: Option<Uuid>) -> DatabaseResult<T> {
        let id = entity.id();
        let previous = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| DatabaseError::not_found(T::RESOURCE, id))?;

        let audit = entity.audit_mut();
        *audit = previous.audit().clone();
        audit.stamp_updated(actor, Utc::now());

        let mut builder = Self::update_statement(&entity)?;
        let stored = builder
            .build_query_as::<T>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_write(T::RESOURCE, e))?
            .ok_or_else(|| DatabaseError::not_found(T::RESOURCE, id))?;
        debug!(resource = T::RESOURCE, %id, "Updated");
        Ok(stored)
    }

    async fn soft_delete(&self, id: Uuid, actor: Option<Uuid>) -> DatabaseResult<T> {
        let sql = format!(
            "UPDATE {} SET is_deleted = true, deleted_at = $1, deleted_by = $2, \
             updated_at = $1, updated_by = $2 \
             WHERE id = $3 AND is_deleted = false RETURNING *",
            T::TABLE
        );
        let stored = sqlx::query_as::<_, T>(&sql)
            .bind(Utc::now())
            .bind(actor)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found(T::RESOURCE, id))?;
        debug!(resource = T::RESOURCE, %id, "Soft deleted");
        Ok(stored)
    }

    async fn restore(&self, id: Uuid, actor: Option<Uuid>) -> DatabaseResult<T> {
        let sql = format!(
            "UPDATE {} SET is_deleted = false, deleted_at = NULL, deleted_by = NULL, \
             updated_at = $1, updated_by = $2 \
             WHERE id = $3 AND is_deleted = true RETURNING *",
            T::TABLE
        );
        let restored = sqlx::query_as::<_, T>(&sql)
            .bind(Utc::now())
            .bind(actor)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_write(T::RESOURCE, e))?;

        match restored {
            Some(row) => {
                debug!(resource = T::RESOURCE, %id, "Restored");
                Ok(row)
            }
            None => self
                .find_including_deleted(id)
                .await?
                .ok_or_else(|| DatabaseError::not_found(T::RESOURCE, id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AuditInfo, Doctor};

    fn doctor() -> Doctor {
        Doctor {
            id: Uuid::new_v4(),
            first_name: "Hamid".to_string(),
            last_name: "Nouri".to_string(),
            medical_council_code: "M-12345".to_string(),
            specialty: "General".to_string(),
            mobile: None,
            is_active: true,
            audit: AuditInfo::default(),
        }
    }

    #[test]
    fn test_list_statement() {
        let query = ListQuery::new()
            .with_filter("specialty", "General")
            .with_filter("is_active", "true")
            .with_search("nouri")
            .with_sort("last_name", false)
            .with_page(2, 10);
        let builder = PgRepository::<Doctor>::list_statement(&query).unwrap();
        assert_eq!(
            builder.sql(),
            "SELECT * FROM doctors WHERE 1 = 1 AND is_deleted = false \
             AND is_active = $1 AND specialty = $2 \
             AND (first_name ILIKE $3 OR last_name ILIKE $4 \
             OR medical_council_code ILIKE $5 OR specialty ILIKE $6) \
             ORDER BY last_name ASC NULLS LAST, id ASC LIMIT $7 OFFSET $8"
        );
    }

    #[test]
    fn test_list_statement_defaults() {
        let query = ListQuery::new().including_deleted(true);
        let builder = PgRepository::<Doctor>::list_statement(&query).unwrap();
        assert_eq!(
            builder.sql(),
            "SELECT * FROM doctors WHERE 1 = 1 \
             ORDER BY created_at DESC NULLS LAST, id ASC LIMIT $1 OFFSET $2"
        );

        let unsortable = ListQuery::new().with_sort("mobile", true);
        assert!(matches!(
            PgRepository::<Doctor>::list_statement(&unsortable),
            Err(DatabaseError::InvalidSort { .. })
        ));
    }

    #[test]
    fn test_update_statement() {
        let builder = PgRepository::<Doctor>::update_statement(&doctor()).unwrap();
        assert_eq!(
            builder.sql(),
            "UPDATE doctors SET first_name = $1, last_name = $2, \
             medical_council_code = $3, specialty = $4, mobile = $5, is_active = $6, \
             updated_at = $7, updated_by = $8 \
             WHERE id = $9 AND is_deleted = false RETURNING *"
        );
    }
}
