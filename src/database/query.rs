//! Construcción de sentencias SQL
//!
//! Los nombres de tabla y columna no se pueden enviar como parámetros, así que
//! se validan contra un patrón de identificador antes de entrar en el texto
//! SQL. Todos los valores van como parámetros (`$1`, `$2`, ...).

use lazy_static::lazy_static;
use regex::Regex;
use sqlx::query_builder::Separated;
use sqlx::{Postgres, QueryBuilder};

use crate::models::{Condition, SqlValue, TableSpec};
use crate::utils::errors::{DbError, DbResult};

/// Límite de parámetros por sentencia del protocolo de PostgreSQL
pub const MAX_BIND_PARAMS: usize = 65_535;

lazy_static! {
    static ref IDENTIFIER_RE: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$").unwrap();
    static ref COLUMN_TYPE_RE: Regex = Regex::new(r"^[A-Za-z][A-Za-z0-9_ (),\[\]]*$").unwrap();
}

pub fn validate_identifier(name: &str) -> DbResult<&str> {
    if IDENTIFIER_RE.is_match(name) {
        Ok(name)
    } else {
        Err(DbError::InvalidIdentifier(name.to_string()))
    }
}

pub fn validate_column_type(definition: &str) -> DbResult<&str> {
    let trimmed = definition.trim();
    if COLUMN_TYPE_RE.is_match(trimmed) {
        Ok(trimmed)
    } else {
        Err(DbError::InvalidColumnType(definition.to_string()))
    }
}

fn validate_fields<S: AsRef<str>>(fields: &[S]) -> DbResult<()> {
    if fields.is_empty() {
        return Err(DbError::InvalidIdentifier(String::new()));
    }
    for field in fields {
        validate_identifier(field.as_ref())?;
    }
    Ok(())
}

/// `CREATE TABLE IF NOT EXISTS name (col type, ...);`
pub fn create_table_sql(table: &TableSpec) -> DbResult<String> {
    let name = validate_identifier(&table.name)?;
    let columns = table
        .columns
        .iter()
        .map(|column| {
            let column_name = validate_identifier(&column.name)?;
            let definition = validate_column_type(&column.definition)?;
            Ok::<_, DbError>(format!("{} {}", column_name, definition))
        })
        .collect::<DbResult<Vec<_>>>()?;

    Ok(format!("CREATE TABLE IF NOT EXISTS {} ({});", name, columns.join(", ")))
}

/// Filas por sentencia INSERT, respetando el lote configurado y el
/// límite de parámetros
pub fn rows_per_statement(batch_size: usize, field_count: usize) -> usize {
    let by_params = MAX_BIND_PARAMS / field_count.max(1);
    batch_size.min(by_params).max(1)
}

/// Verificar que cada fila tenga tantos valores como campos
pub fn check_row_arity(field_count: usize, rows: &[Vec<SqlValue>]) -> DbResult<()> {
    match rows.iter().find(|row| row.len() != field_count) {
        Some(row) => Err(DbError::RowArity {
            expected: field_count,
            found: row.len(),
        }),
        None => Ok(()),
    }
}

/// `INSERT INTO table (f1, f2) VALUES ($1, $2), ($3, $4)`
pub fn insert_query<S: AsRef<str>>(
    table: &str,
    fields: &[S],
    rows: &[Vec<SqlValue>],
) -> DbResult<QueryBuilder<'static, Postgres>> {
    validate_identifier(table)?;
    validate_fields(fields)?;
    check_row_arity(fields.len(), rows)?;

    let mut builder = QueryBuilder::new(format!("INSERT INTO {} (", table));
    let mut columns = builder.separated(", ");
    for field in fields {
        columns.push(field.as_ref());
    }
    builder.push(") ");

    builder.push_values(rows, |mut tuple, row| {
        for value in row {
            push_separated_value(&mut tuple, value.clone());
        }
    });

    Ok(builder)
}

/// `SELECT f1, f2 FROM table WHERE ...` (o `SELECT *` sin campos)
pub fn select_query<S: AsRef<str>>(
    table: &str,
    fields: Option<&[S]>,
    conditions: &[Condition],
) -> DbResult<QueryBuilder<'static, Postgres>> {
    validate_identifier(table)?;

    let mut builder = QueryBuilder::new("SELECT ");
    match fields {
        Some(fields) => {
            validate_fields(fields)?;
            let mut columns = builder.separated(", ");
            for field in fields {
                columns.push(field.as_ref());
            }
        }
        None => {
            builder.push("*");
        }
    }
    builder.push(" FROM ").push(table);
    push_where(&mut builder, conditions)?;

    Ok(builder)
}

/// `UPDATE table SET field = $1 WHERE ...`
pub fn update_query(
    table: &str,
    field: &str,
    value: SqlValue,
    conditions: &[Condition],
) -> DbResult<QueryBuilder<'static, Postgres>> {
    validate_identifier(table)?;
    validate_identifier(field)?;

    let mut builder = QueryBuilder::new(format!("UPDATE {} SET {} = ", table, field));
    push_value(&mut builder, value);
    push_where(&mut builder, conditions)?;

    Ok(builder)
}

/// `DELETE FROM table WHERE field = $1`
pub fn delete_query(
    table: &str,
    field: &str,
    value: SqlValue,
) -> DbResult<QueryBuilder<'static, Postgres>> {
    validate_identifier(table)?;

    let mut builder = QueryBuilder::new(format!("DELETE FROM {}", table));
    push_where(&mut builder, &[Condition { field: field.to_string(), value }])?;

    Ok(builder)
}

fn push_where(
    builder: &mut QueryBuilder<'static, Postgres>,
    conditions: &[Condition],
) -> DbResult<()> {
    for (i, condition) in conditions.iter().enumerate() {
        let field = validate_identifier(&condition.field)?;
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        builder.push(field);
        // `= NULL` nunca es verdadero en SQL
        if condition.value == SqlValue::Null {
            builder.push(" IS NULL");
        } else {
            builder.push(" = ");
            push_value(builder, condition.value.clone());
        }
    }
    Ok(())
}

fn push_value(builder: &mut QueryBuilder<'static, Postgres>, value: SqlValue) {
    match value {
        SqlValue::Null => {
            builder.push("NULL");
        }
        SqlValue::Bool(v) => {
            builder.push_bind(v);
        }
        SqlValue::SmallInt(v) => {
            builder.push_bind(v);
        }
        SqlValue::Int(v) => {
            builder.push_bind(v);
        }
        SqlValue::BigInt(v) => {
            builder.push_bind(v);
        }
        SqlValue::Text(v) => {
            builder.push_bind(v);
        }
    }
}

fn push_separated_value(
    tuple: &mut Separated<'_, 'static, Postgres, &'static str>,
    value: SqlValue,
) {
    match value {
        SqlValue::Null => {
            tuple.push("NULL");
        }
        SqlValue::Bool(v) => {
            tuple.push_bind(v);
        }
        SqlValue::SmallInt(v) => {
            tuple.push_bind(v);
        }
        SqlValue::Int(v) => {
            tuple.push_bind(v);
        }
        SqlValue::BigInt(v) => {
            tuple.push_bind(v);
        }
        SqlValue::Text(v) => {
            tuple.push_bind(v);
        }
    }
}
