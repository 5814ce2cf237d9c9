//! Modelos de datos
//!
//! Tablas, valores de parámetros y el registro de usuario.

pub mod table;
pub mod user;

pub use table::{users_table, ColumnSpec, Condition, SqlValue, TableSpec};
pub use user::{NewUser, User};
