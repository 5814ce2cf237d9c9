//! Descripción de tablas, valores y condiciones
//!
//! Tipos que usan los helpers genéricos de la sesión para construir
//! sentencias parametrizadas.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Columna de una tabla: nombre y definición de tipo (`BIGINT PRIMARY KEY`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub definition: String,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            definition: definition.into(),
        }
    }
}

/// Tabla con sus columnas, en orden
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSpec {
    pub name: String,
    pub columns: Vec<ColumnSpec>,
}

impl TableSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn column(mut self, name: impl Into<String>, definition: impl Into<String>) -> Self {
        self.columns.push(ColumnSpec::new(name, definition));
        self
    }
}

/// Esquema de la tabla `users`
pub fn users_table() -> TableSpec {
    TableSpec::new("users")
        .column("id_user", "BIGINT PRIMARY KEY")
        .column("class_", "SMALLINT")
        .column("age", "SMALLINT")
        .column("nationality", "TEXT")
}

/// Valor que se envía como parámetro de una sentencia
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Bool(bool),
    SmallInt(i16),
    Int(i32),
    BigInt(i64),
    Text(String),
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Bool(v) => write!(f, "{}", v),
            SqlValue::SmallInt(v) => write!(f, "{}", v),
            SqlValue::Int(v) => write!(f, "{}", v),
            SqlValue::BigInt(v) => write!(f, "{}", v),
            SqlValue::Text(v) => write!(f, "'{}'", v),
        }
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<i16> for SqlValue {
    fn from(v: i16) -> Self {
        SqlValue::SmallInt(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(v)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::BigInt(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

/// Predicado de igualdad `field = value`
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub value: SqlValue,
}

impl Condition {
    pub fn eq(field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_users_table_schema() {
        let table = users_table();
        assert_eq!(table.name, "users");
        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["id_user", "class_", "age", "nationality"]);
        assert_eq!(table.columns[0].definition, "BIGINT PRIMARY KEY");
    }

    #[test]
    fn test_optional_values_become_null() {
        assert_eq!(SqlValue::from(None::<String>), SqlValue::Null);
        assert_eq!(SqlValue::from(Some("USA")), SqlValue::Text("USA".to_string()));
        assert_eq!(SqlValue::from(100_i64).to_string(), "100");
    }
}
