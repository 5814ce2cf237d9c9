//! Sistema de manejo de errores
//!
//! Este módulo define los tipos de errores de la sesión de base de datos.
//! Los errores del driver se propagan sin modificar dentro de `DbError::Database`.

use std::time::Duration;
use thiserror::Error;

/// Errores principales de la sesión
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Connection timed out after {0:?}")]
    ConnectTimeout(Duration),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid SQL identifier: '{0}'")]
    InvalidIdentifier(String),

    #[error("Invalid column type: '{0}'")]
    InvalidColumnType(String),

    #[error("Row has {found} values but {expected} fields were given")]
    RowArity { expected: usize, found: usize },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DbError {
    /// Indica si el error viene del servidor o de la red
    pub fn is_database(&self) -> bool {
        matches!(self, DbError::Database(_) | DbError::ConnectTimeout(_))
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type DbResult<T> = Result<T, DbError>;

/// Función helper para crear errores de registro no encontrado
pub fn not_found_error(table: &str, field: &str, key: &str) -> DbError {
    DbError::NotFound(format!("no row in '{}' with {} = {}", table, field, key))
}

/// Función helper para crear errores de configuración
pub fn config_error(variable: &str, value: &str) -> DbError {
    DbError::Config(format!("{} has an invalid value: '{}'", variable, value))
}
