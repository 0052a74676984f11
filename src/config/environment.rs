//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.
//! `from_env` nunca entra en pánico: una variable inválida se devuelve como error.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Implementación del almacén que usa el servidor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(()),
        }
    }
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub manifest_dir: PathBuf,
    pub cors_origins: Vec<String>,
    pub log_level: String,
    pub store_backend: StoreBackend,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_url: None,
            db_max_connections: 20,
            db_min_connections: 5,
            manifest_dir: default_manifest_dir(),
            cors_origins: Vec::new(),
            log_level: "debug".to_string(),
            store_backend: StoreBackend::Postgres,
        }
    }
}

/// `$HOME/Desktop`, o `./manifests` si no hay directorio personal
pub fn default_manifest_dir() -> PathBuf {
    env::var_os("HOME")
        .map(|home| PathBuf::from(home).join("Desktop"))
        .unwrap_or_else(|| PathBuf::from("manifests"))
}

fn parse_var<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(default),
    }
}

impl EnvironmentConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let store_backend = parse_var("STORE_BACKEND", defaults.store_backend)?;
        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty());
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let config = Self {
            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", defaults.port)?,
            database_url,
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            db_min_connections: parse_var("DB_MIN_CONNECTIONS", defaults.db_min_connections)?,
            manifest_dir: env::var_os("MANIFEST_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.manifest_dir),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|origins| parse_origins(&origins))
                .unwrap_or_default(),
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            store_backend,
        };

        if config.db_min_connections > config.db_max_connections {
            return Err(ConfigError::Invalid {
                key: "DB_MIN_CONNECTIONS",
                value: config.db_min_connections.to_string(),
            });
        }

        Ok(config)
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Obtener la dirección del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_backend_parsing() {
        assert_eq!("postgres".parse::<StoreBackend>(), Ok(StoreBackend::Postgres));
        assert_eq!(" Memory ".parse::<StoreBackend>(), Ok(StoreBackend::Memory));
        assert!("sqlite".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn test_parse_origins_skips_empty_entries() {
        assert_eq!(
            parse_origins("http://localhost:5173, ,https://aid.example.org"),
            vec!["http://localhost:5173", "https://aid.example.org"]
        );
    }

    #[test]
    fn test_defaults() {
        let config = EnvironmentConfig::default();
        assert!(config.is_development());
        assert_eq!(config.server_url(), "0.0.0.0:3000");
        assert!(config.db_min_connections <= config.db_max_connections);
    }
}
