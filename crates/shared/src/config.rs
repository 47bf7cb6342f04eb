//! Application configuration management.

use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::jwt::JwtConfig;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtConfig,
    /// Invoice behaviour knobs.
    #[serde(default)]
    pub invoice: InvoiceConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Invoice configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceConfig {
    /// How many times an auto-generated invoice number is re-allocated
    /// after losing a uniqueness race.
    #[serde(default = "default_number_retry_attempts")]
    pub number_retry_attempts: u32,
}

impl Default for InvoiceConfig {
    fn default() -> Self {
        Self {
            number_retry_attempts: default_number_retry_attempts(),
        }
    }
}

fn default_number_retry_attempts() -> u32 {
    5
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones winning: `config/default.toml`,
    /// `config/{APP_ENV}.toml`, then `INVOICELY__SECTION__KEY` variables.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] if a source cannot be read, a required
    /// key is missing, or the values fail [`AppConfig::validate`].
    pub fn load() -> AppResult<Self> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{app_env}")).required(false))
            .add_source(config::Environment::with_prefix("INVOICELY").separator("__"))
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the server cannot run with.
    pub fn validate(&self) -> AppResult<()> {
        if self.database.url.trim().is_empty() {
            return Err(AppError::Config("database.url is empty".into()));
        }
        if self.jwt.secret.trim().is_empty() {
            return Err(AppError::Config("jwt.secret is empty".into()));
        }
        if self.database.min_connections > self.database.max_connections {
            return Err(AppError::Config(
                "database.min_connections exceeds max_connections".into(),
            ));
        }
        if self.invoice.number_retry_attempts == 0 {
            return Err(AppError::Config(
                "invoice.number_retry_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("INVOICELY__DATABASE__URL", Some("sqlite::memory:")),
                ("INVOICELY__JWT__SECRET", Some("env-secret")),
                ("INVOICELY__SERVER__PORT", Some("9090")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "sqlite::memory:");
                assert_eq!(config.jwt.secret, "env-secret");
                assert_eq!(config.server.port, 9090);
                assert_eq!(config.server.host, "0.0.0.0");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.invoice.number_retry_attempts, 5);
                assert_eq!(config.jwt.access_token_expires_minutes, 60);
            },
        );
    }

    #[test]
    fn test_missing_database_url_fails() {
        temp_env::with_vars(
            [
                ("INVOICELY__DATABASE__URL", None::<&str>),
                ("INVOICELY__JWT__SECRET", Some("env-secret")),
            ],
            || {
                assert!(matches!(AppConfig::load(), Err(AppError::Config(_))));
            },
        );
    }

    #[test]
    fn test_blank_secret_is_rejected() {
        temp_env::with_vars(
            [
                ("INVOICELY__DATABASE__URL", Some("sqlite::memory:")),
                ("INVOICELY__JWT__SECRET", Some("  ")),
            ],
            || {
                let err = AppConfig::load().unwrap_err();
                assert_eq!(err.to_string(), "Configuration error: jwt.secret is empty");
            },
        );
    }

    #[test]
    fn test_zero_retry_attempts_is_rejected() {
        temp_env::with_vars(
            [
                ("INVOICELY__DATABASE__URL", Some("sqlite::memory:")),
                ("INVOICELY__JWT__SECRET", Some("env-secret")),
                ("INVOICELY__INVOICE__NUMBER_RETRY_ATTEMPTS", Some("0")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }
}
