use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use billing_service::BillingService;
use config_engine::{ClinicConfig, StorageBackend};
use database_layer::{DatabasePool, Repositories};
use insurance_service::InsuranceService;
use reception_service::ReceptionService;
use tracing::info;

/// Main clinic server state
#[derive(Clone)]
pub struct ClinicServer {
    /// Resolved configuration
    pub config: Arc<ClinicConfig>,
    /// One repository per entity, shared by every service
    pub repos: Repositories,
    /// Front desk workflow; also owns the insurance and billing services
    pub reception: ReceptionService,
    /// Connection pool, absent for the in-memory backend
    pub db_pool: Option<DatabasePool>,
    started_at: Instant,
}

impl ClinicServer {
    /// Build the state for the configured storage backend
    ///
    /// For PostgreSQL this connects and, when enabled, applies migrations.
    pub async fn from_config(config: ClinicConfig) -> Result<Self> {
        match config.database.backend {
            StorageBackend::Memory => Ok(Self::in_memory(config)),
            StorageBackend::Postgres => {
                let pool =
                    DatabasePool::connect(&config.database.url, config.database.max_connections)
                        .await?;
                if config.database.run_migrations {
                    pool.migrate().await?;
                }
                let repos = Repositories::postgres(pool.pool().clone());
                Ok(Self::with_repositories(config, repos, Some(pool)))
            }
        }
    }

    /// Server backed by process-local storage
    pub fn in_memory(config: ClinicConfig) -> Self {
        info!("Using in-memory storage; data is lost on restart");
        Self::with_repositories(config, Repositories::in_memory(), None)
    }

    fn with_repositories(
        config: ClinicConfig,
        repos: Repositories,
        db_pool: Option<DatabasePool>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            reception: ReceptionService::new(repos.clone()),
            repos,
            db_pool,
            started_at: Instant::now(),
        }
    }

    pub fn insurance(&self) -> &InsuranceService {
        self.reception.insurance()
    }

    pub fn billing(&self) -> &BillingService {
        self.reception.billing()
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
