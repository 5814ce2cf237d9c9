//! Sesión asíncrona sobre PostgreSQL con helpers CRUD para la tabla `users`.

pub mod config;
pub mod database;
pub mod models;
pub mod repositories;
pub mod utils;

pub use config::{DatabaseConfig, EnvironmentConfig};
pub use database::{Database, SessionState};
pub use models::{users_table, Condition, NewUser, SqlValue, TableSpec, User};
pub use repositories::UserRepository;
pub use utils::errors::{DbError, DbResult};
