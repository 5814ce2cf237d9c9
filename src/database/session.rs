//! Sesión de base de datos
//!
//! `Database` guarda los parámetros de conexión y, opcionalmente, una conexión
//! persistente. Cuando no hay conexión persistente cada operación abre una
//! conexión ad-hoc y la cierra al terminar, tanto si tuvo éxito como si falló.

use futures::future::BoxFuture;
use rand::Rng;
use sqlx::postgres::PgRow;
use sqlx::{Connection, Executor, PgConnection};
use std::fmt;
use tracing::{debug, info, warn};

use super::connection::open_connection;
use super::query;
use crate::config::DatabaseConfig;
use crate::models::{Condition, SqlValue, TableSpec};
use crate::utils::errors::{DbError, DbResult};

/// Estado de la conexión de la sesión
pub enum SessionState {
    Closed,
    Open(PgConnection),
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Closed => write!(f, "Closed"),
            SessionState::Open(_) => write!(f, "Open"),
        }
    }
}

/// Conexión prestada para una sola operación.
///
/// `Persistent` apunta a la conexión de la sesión; `AdHoc` es dueña de una
/// conexión abierta solo para esta operación. Si el lease se descarta sin
/// llamar a `finish` (error o cancelación) la conexión ad-hoc se libera en su
/// `Drop`.
pub enum ConnectionLease<'a> {
    Persistent(&'a mut PgConnection),
    AdHoc(PgConnection),
}

impl<'a> ConnectionLease<'a> {
    pub fn connection(&mut self) -> &mut PgConnection {
        match self {
            ConnectionLease::Persistent(conn) => &mut **conn,
            ConnectionLease::AdHoc(conn) => conn,
        }
    }

    pub fn is_ad_hoc(&self) -> bool {
        matches!(self, ConnectionLease::AdHoc(_))
    }

    /// Cerrar la conexión ad-hoc (si la hay) y devolver el resultado de la
    /// operación. El error de la operación tiene prioridad sobre el del cierre.
    pub async fn finish<T>(self, result: DbResult<T>) -> DbResult<T> {
        let conn = match self {
            ConnectionLease::Persistent(_) => return result,
            ConnectionLease::AdHoc(conn) => conn,
        };

        let closed = conn.close().await;
        debug!("🔌 Conexión ad-hoc cerrada");
        match (result, closed) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e.into()),
            (Err(e), Err(close_err)) => {
                warn!("⚠️ Error cerrando conexión ad-hoc tras fallo: {}", close_err);
                Err(e)
            }
            (Err(e), Ok(())) => Err(e),
        }
    }
}

/// Sesión de base de datos PostgreSQL
pub struct Database {
    config: DatabaseConfig,
    state: SessionState,
    session_id: u32,
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("session_id", &self.session_id)
            .field("config", &self.config)
            .field("state", &self.state)
            .finish()
    }
}

impl Database {
    pub fn new(config: DatabaseConfig) -> Self {
        let session_id = rand::thread_rng().gen_range(1000..=999_999);
        debug!(
            "🆕 Sesión {} creada para {}:{}/{}",
            session_id, config.host, config.port, config.name
        );
        Self {
            config,
            state: SessionState::Closed,
            session_id,
        }
    }

    /// Ejecutar `f` con una conexión persistente que se cierra al salir,
    /// también cuando `f` falla.
    pub async fn scoped<T, F>(config: DatabaseConfig, f: F) -> DbResult<T>
    where
        T: Send,
        F: for<'s> FnOnce(&'s mut Database) -> BoxFuture<'s, DbResult<T>>,
    {
        let mut db = Database::new(config);
        db.persistent(f).await
    }

    /// Igual que `scoped` pero sobre una sesión existente. Si la sesión ya
    /// estaba conectada la conexión se mantiene abierta al terminar.
    pub async fn persistent<T, F>(&mut self, f: F) -> DbResult<T>
    where
        T: Send,
        F: for<'s> FnOnce(&'s mut Database) -> BoxFuture<'s, DbResult<T>>,
    {
        let opened_here = !self.is_connected();
        self.connect().await?;
        let result = f(self).await;
        self.release(opened_here, result).await
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub fn session_id(&self) -> u32 {
        self.session_id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, SessionState::Open(_))
    }

    /// Abrir la conexión persistente; no hace nada si ya existe
    pub async fn connect(&mut self) -> DbResult<()> {
        if self.is_connected() {
            return Ok(());
        }
        let conn = open_connection(&self.config).await?;
        self.state = SessionState::Open(conn);
        info!("✅ Sesión {}: conexión persistente abierta", self.session_id);
        Ok(())
    }

    /// Cerrar la conexión persistente; no hace nada si no hay conexión
    pub async fn close(&mut self) -> DbResult<()> {
        if let SessionState::Open(conn) = std::mem::replace(&mut self.state, SessionState::Closed) {
            conn.close().await?;
            info!("🔌 Sesión {}: conexión persistente cerrada", self.session_id);
        }
        Ok(())
    }

    async fn release<T>(&mut self, opened_here: bool, result: DbResult<T>) -> DbResult<T> {
        if !opened_here {
            return result;
        }
        match (result, self.close().await) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Err(close_err)) => {
                warn!(
                    "⚠️ Sesión {}: error cerrando conexión tras fallo: {}",
                    self.session_id, close_err
                );
                Err(e)
            }
            (Err(e), Ok(())) => Err(e),
        }
    }

    /// Conexión para una operación: la persistente o una ad-hoc nueva
    pub async fn lease(&mut self) -> DbResult<ConnectionLease<'_>> {
        match self.state {
            SessionState::Open(ref mut conn) => Ok(ConnectionLease::Persistent(conn)),
            SessionState::Closed => {
                debug!("🔗 Sesión {}: abriendo conexión ad-hoc", self.session_id);
                let conn = open_connection(&self.config).await?;
                Ok(ConnectionLease::AdHoc(conn))
            }
        }
    }

    /// Ejecutar SQL tal cual (puede contener varias sentencias).
    /// Devuelve el número de filas afectadas.
    pub async fn execute_query(&mut self, sql: &str) -> DbResult<u64> {
        debug!("📝 Sesión {}: {}", self.session_id, sql);
        let mut lease = self.lease().await?;
        let result = lease
            .connection()
            .execute(sql)
            .await
            .map(|done| done.rows_affected())
            .map_err(Into::into);
        lease.finish(result).await
    }

    /// Ejecutar SQL tal cual y devolver las filas
    pub async fn fetch(&mut self, sql: &str) -> DbResult<Vec<PgRow>> {
        debug!("🔍 Sesión {}: {}", self.session_id, sql);
        let mut lease = self.lease().await?;
        let result = lease.connection().fetch_all(sql).await.map_err(Into::into);
        lease.finish(result).await
    }

    /// Crear las tablas que no existan, una sentencia por tabla
    pub async fn create_tables(&mut self, tables: &[TableSpec]) -> DbResult<()> {
        let statements = tables
            .iter()
            .map(query::create_table_sql)
            .collect::<DbResult<Vec<_>>>()?;

        let opened_here = !self.is_connected();
        self.connect().await?;

        let mut result = Ok(());
        if let SessionState::Open(conn) = &mut self.state {
            for (table, sql) in tables.iter().zip(&statements) {
                if let Err(e) = (&mut *conn).execute(sql.as_str()).await {
                    result = Err(e.into());
                    break;
                }
                debug!("📋 Sesión {}: tabla '{}' lista", self.session_id, table.name);
            }
        }

        self.release(opened_here, result).await?;
        info!("✅ Sesión {}: {} tabla(s) creadas", self.session_id, statements.len());
        Ok(())
    }

    /// Insertar filas en lotes de como máximo `insert_batch_size` filas.
    /// Devuelve el número de filas insertadas.
    pub async fn fill_table<S: AsRef<str>>(
        &mut self,
        table_name: &str,
        field_names: &[S],
        rows: &[Vec<SqlValue>],
    ) -> DbResult<u64> {
        if rows.is_empty() {
            return Ok(0);
        }
        // Validar todo antes de abrir conexión
        query::insert_query(table_name, field_names, &rows[..1])?;
        query::check_row_arity(field_names.len(), rows)?;

        let per_statement =
            query::rows_per_statement(self.config.insert_batch_size, field_names.len());
        let session_id = self.session_id;
        let mut lease = self.lease().await?;

        let result = async {
            let mut inserted = 0;
            for chunk in rows.chunks(per_statement) {
                let mut builder = query::insert_query(table_name, field_names, chunk)?;
                let done = builder.build().execute(lease.connection()).await?;
                inserted += done.rows_affected();
                debug!(
                    "📥 Sesión {}: {} fila(s) insertadas en '{}'",
                    session_id,
                    done.rows_affected(),
                    table_name
                );
            }
            Ok::<u64, DbError>(inserted)
        }
        .await;

        lease.finish(result).await
    }

    /// Leer filas de una tabla. Sin `field_names` se seleccionan todas las
    /// columnas; las condiciones se combinan con AND.
    pub async fn get_table_data<S: AsRef<str>>(
        &mut self,
        table_name: &str,
        field_names: Option<&[S]>,
        conditions: &[Condition],
    ) -> DbResult<Vec<PgRow>> {
        let mut builder = query::select_query(table_name, field_names, conditions)?;
        debug!("🔍 Sesión {}: {}", self.session_id, builder.sql());

        let mut lease = self.lease().await?;
        let result = builder.build().fetch_all(lease.connection()).await.map_err(Into::into);
        lease.finish(result).await
    }

    /// `UPDATE table SET field = value WHERE ...`; devuelve filas afectadas
    pub async fn update_value(
        &mut self,
        table_name: &str,
        field_name: &str,
        value: impl Into<SqlValue>,
        conditions: &[Condition],
    ) -> DbResult<u64> {
        let mut builder = query::update_query(table_name, field_name, value.into(), conditions)?;
        debug!("✏️ Sesión {}: {}", self.session_id, builder.sql());

        let mut lease = self.lease().await?;
        let result = builder
            .build()
            .execute(lease.connection())
            .await
            .map(|done| done.rows_affected())
            .map_err(Into::into);
        lease.finish(result).await
    }

    /// `DELETE FROM table WHERE field = value`; devuelve filas borradas
    pub async fn delete_value(
        &mut self,
        table_name: &str,
        field_name: &str,
        value: impl Into<SqlValue>,
    ) -> DbResult<u64> {
        let value = value.into();
        let mut builder = query::delete_query(table_name, field_name, value.clone())?;

        let mut lease = self.lease().await?;
        let result = builder
            .build()
            .execute(lease.connection())
            .await
            .map(|done| done.rows_affected())
            .map_err(Into::into);
        let deleted = lease.finish(result).await?;

        info!(
            "🗑️ Sesión {}: {} fila(s) borradas de '{}' con {} = {}",
            self.session_id, deleted, table_name, field_name, value
        );
        Ok(deleted)
    }
}
