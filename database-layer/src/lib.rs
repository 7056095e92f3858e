//! Storage layer for the clinic engine
//!
//! Every clinical and insurance record is an [`Entity`]: a row in its own
//! table carrying an embedded [`AuditInfo`] (creation, modification and
//! soft-delete stamps). Records are never physically removed; deleting sets
//! `is_deleted` and the reads skip them unless asked otherwise.
//!
//! Access goes through the [`Repository`] trait, which has two backends
//! with identical semantics:
//!
//! - **[`PgRepository`]**: PostgreSQL through `sqlx`, statements built with
//!   `QueryBuilder` from whitelisted column names and bound values
//! - **[`InMemoryRepository`]**: a `DashMap` per entity, used by tests and
//!   `--in-memory` development runs
//!
//! # Example
//!
//! ```rust
//! use database_layer::{ListQuery, Repositories, Repository};
//!
//! # async fn example() -> Result<(), database_layer::DatabaseError> {
//! let repos = Repositories::in_memory();
//! let query = ListQuery::new()
//!     .with_search("احمدی")
//!     .with_sort("last_name", false)
//!     .with_page(1, 20);
//!
//! let page = repos.patients.list(&query).await?;
//! assert_eq!(page.total_pages(), 1);
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod connection;
pub mod entity;
pub mod error;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod query;
pub mod repositories;
pub mod repository;

pub use audit::AuditInfo;
pub use connection::DatabasePool;
pub use entity::{value_of, Entity, UniqueKey};
pub use error::{DatabaseError, DatabaseResult};
pub use memory::InMemoryRepository;
pub use models::*;
pub use postgres::PgRepository;
pub use query::{FieldKind, FieldValue, ListQuery, Page, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use repositories::{Repo, Repositories};
pub use repository::{Repository, NUMBERING_ATTEMPTS};
