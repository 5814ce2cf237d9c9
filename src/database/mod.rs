//! Módulo de base de datos
//!
//! Maneja la conexión y las operaciones con PostgreSQL

pub mod connection;
pub mod query;
pub mod session;

pub use connection::{mask_database_url, open_connection};
pub use session::{ConnectionLease, Database, SessionState};
