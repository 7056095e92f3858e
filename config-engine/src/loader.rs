use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use tracing::{debug, info};

use crate::error::Result;
use crate::settings::ClinicConfig;

/// Environment variable prefix; nesting uses `__` (`CLINIC_DATABASE__URL`)
pub const ENV_PREFIX: &str = "CLINIC_";

/// Builds a [`ClinicConfig`] from defaults, an optional YAML file and the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    load_dotenv: bool,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read this YAML file if it exists; a missing file is not an error
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Load `.env` into the process environment before reading variables
    pub fn with_dotenv(mut self, enabled: bool) -> Self {
        self.load_dotenv = enabled;
        self
    }

    pub fn figment(&self) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(ClinicConfig::default()));

        if let Some(path) = &self.file {
            if path.exists() {
                debug!(path = %path.display(), "Loading configuration file");
                figment = figment.merge(Yaml::file(path));
            } else {
                debug!(path = %path.display(), "Configuration file not found, using defaults");
            }
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Extract and validate the configuration
    pub fn load(&self) -> Result<ClinicConfig> {
        if self.load_dotenv {
            // A missing .env file is the normal case outside development
            let _ = dotenvy::dotenv();
        }

        let config: ClinicConfig = self.figment().extract()?;
        config.validate()?;

        info!(
            backend = ?config.database.backend,
            port = config.server.port,
            "Configuration loaded"
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{CurrencyDisplay, StorageBackend};
    use figment::Jail;

    #[test]
    fn test_defaults_without_sources() {
        Jail::expect_with(|_jail| {
            let config = ConfigLoader::new().load().map_err(|e| e.to_string())?;
            assert_eq!(config, ClinicConfig::default());
            Ok(())
        });
    }

    #[test]
    fn test_yaml_then_env_precedence() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "clinic.yaml",
                r#"
server:
  port: 9000
database:
  backend: memory
clinic:
  name: "Test Clinic"
  currency_display: toman
"#,
            )?;
            jail.set_env("CLINIC_SERVER__PORT", "9100");
            jail.set_env("CLINIC_PAGINATION__DEFAULT_PAGE_SIZE", "50");

            let config = ConfigLoader::new()
                .with_file("clinic.yaml")
                .load()
                .map_err(|e| e.to_string())?;

            assert_eq!(config.server.port, 9100);
            assert_eq!(config.database.backend, StorageBackend::Memory);
            assert_eq!(config.pagination.default_page_size, 50);
            assert_eq!(config.clinic.name, "Test Clinic");
            assert_eq!(config.clinic.currency_display, CurrencyDisplay::Toman);
            Ok(())
        });
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        Jail::expect_with(|_jail| {
            let config = ConfigLoader::new()
                .with_file("does-not-exist.yaml")
                .load()
                .map_err(|e| e.to_string())?;
            assert_eq!(config.server.port, 8080);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        Jail::expect_with(|jail| {
            jail.set_env("CLINIC_PAGINATION__MAX_PAGE_SIZE", "0");
            assert!(ConfigLoader::new().load().is_err());
            Ok(())
        });
    }
}
