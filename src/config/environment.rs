//! Configuración de variables de entorno
//!
//! Este módulo maneja el entorno de ejecución y el nivel de logging.

use std::env;
use std::str::FromStr;
use tracing::Level;

use crate::utils::errors::{config_error, DbResult};

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub log_level: Level,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            log_level: Level::INFO,
        }
    }
}

impl EnvironmentConfig {
    /// Cargar desde `ENVIRONMENT` y `LOG_LEVEL`
    pub fn from_env() -> DbResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> DbResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let log_level = match lookup("LOG_LEVEL") {
            Some(raw) => Level::from_str(raw.trim()).map_err(|_| config_error("LOG_LEVEL", &raw))?,
            None => defaults.log_level,
        };

        Ok(Self {
            environment: lookup("ENVIRONMENT").unwrap_or(defaults.environment),
            log_level,
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
