use error_common::{codes, ClinicError};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: Uuid },

    #[error("Conflict on {resource}: {message}")]
    Conflict { resource: &'static str, message: String },

    #[error("Invalid filter on {resource}: {message}")]
    InvalidFilter { resource: &'static str, message: String },

    #[error("Cannot sort {resource} by '{field}'")]
    InvalidSort { resource: &'static str, field: String },

    #[error("Migration error: {0}")]
    MigrationError(String),

    #[error("Database error: {0}")]
    SqlxError(#[source] sqlx::Error),
}

impl From<sqlx::Error> for DatabaseError {
    /// Pool and transport failures become [`DatabaseError::ConnectionFailed`]
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => DatabaseError::ConnectionFailed(err.to_string()),
            _ => DatabaseError::SqlxError(err),
        }
    }
}

impl DatabaseError {
    pub fn not_found(resource: &'static str, id: Uuid) -> Self {
        DatabaseError::NotFound { resource, id }
    }

    pub fn conflict(resource: &'static str, message: impl Into<String>) -> Self {
        DatabaseError::Conflict {
            resource,
            message: message.into(),
        }
    }

    pub fn invalid_filter(resource: &'static str, message: impl Into<String>) -> Self {
        DatabaseError::InvalidFilter {
            resource,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::NotFound { .. })
    }

    /// A unique-key conflict naming `column`, from either backend
    pub fn is_conflict_on(&self, column: &str) -> bool {
        matches!(self, DatabaseError::Conflict { message, .. } if message.contains(column))
    }

    pub fn code(&self) -> &'static str {
        match self {
            DatabaseError::ConnectionFailed(_) => codes::database::CONNECTION_FAILED,
            DatabaseError::NotFound { .. } => codes::database::NOT_FOUND,
            DatabaseError::Conflict { .. } => codes::database::CONSTRAINT_VIOLATION,
            DatabaseError::InvalidFilter { .. } | DatabaseError::InvalidSort { .. } => {
                codes::validation::INVALID_INPUT
            }
            DatabaseError::QueryFailed(_)
            | DatabaseError::MigrationError(_)
            | DatabaseError::SqlxError(_) => codes::database::QUERY_FAILED,
        }
    }

    /// Translate constraint violations reported by Postgres
    pub(crate) fn from_write(resource: &'static str, err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return DatabaseError::conflict(resource, db.message().to_string());
            }
            if db.is_foreign_key_violation() {
                return DatabaseError::conflict(
                    resource,
                    format!("referenced record does not exist: {}", db.message()),
                );
            }
        }
        err.into()
    }
}

impl From<DatabaseError> for ClinicError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { .. } => ClinicError::NotFound(err.to_string()),
            DatabaseError::Conflict { .. } => ClinicError::Conflict(err.to_string()),
            DatabaseError::InvalidFilter { .. } | DatabaseError::InvalidSort { .. } => {
                ClinicError::ValidationError(err.to_string())
            }
            DatabaseError::ConnectionFailed(_) => ClinicError::NetworkError(err.to_string()),
            DatabaseError::QueryFailed(_)
            | DatabaseError::MigrationError(_)
            | DatabaseError::SqlxError(_) => ClinicError::DatabaseError(err.to_string()),
        }
    }
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;
