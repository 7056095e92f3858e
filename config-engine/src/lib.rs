//! Layered configuration for the clinic engine
//!
//! Settings are resolved in order, later sources overriding earlier ones:
//!
//! - **Defaults**: compiled into [`ClinicConfig::default`]
//! - **YAML file**: `clinic.yaml` or the path passed with `--config`
//! - **Environment**: `CLINIC_` prefixed variables, `__` separating sections
//!
//! # Example
//!
//! ```rust,no_run
//! use config_engine::{ConfigLoader, StorageBackend};
//!
//! // CLINIC_SERVER__PORT=9000 CLINIC_DATABASE__BACKEND=memory
//! let config = ConfigLoader::new()
//!     .with_file("clinic.yaml")
//!     .with_dotenv(true)
//!     .load()?;
//!
//! if config.database.backend == StorageBackend::Memory {
//!     println!("running without PostgreSQL");
//! }
//! # Ok::<(), config_engine::ConfigError>(())
//! ```

pub mod error;
pub mod loader;
pub mod settings;

pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, ENV_PREFIX};
pub use settings::{
    ClinicConfig, ClinicSettings, CurrencyDisplay, DatabaseSettings, PaginationSettings,
    ServerSettings, StorageBackend,
};
