//! Configuración de base de datos
//!
//! Parámetros de conexión a PostgreSQL. Son inmutables una vez construidos:
//! la sesión los clona y nunca los modifica.

use sqlx::postgres::PgConnectOptions;
use std::env;
use std::fmt;
use std::time::Duration;

use crate::utils::errors::{config_error, DbResult};

/// Tamaño de lote por defecto para inserciones
pub const DEFAULT_INSERT_BATCH_SIZE: usize = 500;

/// Configuración de la base de datos
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    pub connect_timeout: Duration,
    pub insert_batch_size: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            name: "db_test1".to_string(),
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            connect_timeout: Duration::from_secs(30),
            insert_batch_size: DEFAULT_INSERT_BATCH_SIZE,
        }
    }
}

// El password nunca sale en logs
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"***")
            .field("connect_timeout", &self.connect_timeout)
            .field("insert_batch_size", &self.insert_batch_size)
            .finish()
    }
}

impl DatabaseConfig {
    /// Cargar la configuración desde variables de entorno (`DB_*`)
    pub fn from_env() -> DbResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Cargar la configuración desde una función de búsqueda arbitraria.
    /// Las variables ausentes toman el valor por defecto.
    pub fn from_lookup<F>(lookup: F) -> DbResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("DB_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| config_error("DB_PORT", &raw))?,
            None => defaults.port,
        };

        let connect_timeout = match lookup("DB_CONNECT_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| config_error("DB_CONNECT_TIMEOUT_SECS", &raw))?,
            None => defaults.connect_timeout,
        };

        let insert_batch_size = match lookup("DB_INSERT_BATCH_SIZE") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(size) if size > 0 => size,
                _ => return Err(config_error("DB_INSERT_BATCH_SIZE", &raw)),
            },
            None => defaults.insert_batch_size,
        };

        Ok(Self {
            host: lookup("DB_HOST").unwrap_or(defaults.host),
            port,
            name: lookup("DB_NAME").unwrap_or(defaults.name),
            user: lookup("DB_USER").unwrap_or(defaults.user),
            password: lookup("DB_PASSWORD").unwrap_or(defaults.password),
            connect_timeout,
            insert_batch_size,
        })
    }

    /// Opciones de conexión para sqlx
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.name)
            .username(&self.user)
            .password(&self.password)
    }

    /// URL de conexión completa (contiene el password)
    pub fn url(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.name
        )
    }
}
