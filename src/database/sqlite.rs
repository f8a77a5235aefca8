//! SQLite sessions over a `sqlx` pool.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use log::debug;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteColumn, SqliteConnection, SqliteRow};
use sqlx::{Column, Executor, Row, Sqlite, SqlitePool, Statement, TypeInfo, ValueRef};

use super::{FetchMode, QueryResult, SessionFactory, SqlSession};
use crate::error_handling::DatabaseError;
use crate::schema::FieldMeta;
use crate::serialize::SourceRow;

const LIST_TABLES_SQL: &str =
    "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name";
const TABLE_INFO_SQL: &str = "SELECT name, type, pk FROM pragma_table_info(?1) ORDER BY cid";
const TABLE_BY_ROOTPAGE_SQL: &str =
    "SELECT tbl_name FROM sqlite_master WHERE rootpage = ?1 AND type IN ('table', 'index')";

/// Hands out pooled connections as sessions.
#[derive(Debug, Clone)]
pub struct SqliteSessionFactory {
    pool: SqlitePool,
}

impl SqliteSessionFactory {
    /// Wraps an open pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl SessionFactory for SqliteSessionFactory {
    async fn connect(&self) -> Result<Box<dyn SqlSession>, DatabaseError> {
        Ok(Box::new(SqliteSession::acquire(&self.pool).await?))
    }
}

/// A single pooled SQLite connection.
#[derive(Debug)]
pub struct SqliteSession {
    conn: PoolConnection<Sqlite>,
}

impl SqliteSession {
    /// Takes a connection from `pool`, waiting for one to become free.
    pub async fn acquire(pool: &SqlitePool) -> Result<Self, DatabaseError> {
        let conn = pool.acquire().await.map_err(DatabaseError::ConnectError)?;
        Ok(Self { conn })
    }
}

fn field_meta(column: &SqliteColumn) -> FieldMeta {
    FieldMeta::from_declared(column.name(), column.type_info().name(), false)
}

/// Reads every value of `row` as bytes, keyed on the value's storage class.
///
/// Numbers are rendered as text. TEXT and BLOB values are passed through
/// untouched, whatever their encoding.
fn decode_row(row: &SqliteRow) -> Result<SourceRow, sqlx::Error> {
    (0..row.len())
        .map(|i| {
            let raw = row.try_get_raw(i)?;
            if raw.is_null() {
                return Ok(None);
            }
            let storage = raw.type_info().name().to_string();
            let bytes = match storage.as_str() {
                "INTEGER" => row.try_get_unchecked::<i64, _>(i)?.to_string().into_bytes(),
                "REAL" => row.try_get_unchecked::<f64, _>(i)?.to_string().into_bytes(),
                _ => row.try_get_unchecked::<Vec<u8>, _>(i)?,
            };
            Ok(Some(bytes))
        })
        .collect()
}

#[async_trait]
impl SqlSession for SqliteSession {
    async fn execute(&mut self, sql: &str) -> Result<(), DatabaseError> {
        (&mut *self.conn)
            .execute(sql)
            .await
            .map_err(|e| DatabaseError::sql(sql, e))?;
        Ok(())
    }

    async fn query<'a>(
        &'a mut self,
        sql: &'a str,
        mode: FetchMode,
    ) -> Result<QueryResult<'a>, DatabaseError> {
        let conn: &'a mut SqliteConnection = &mut self.conn;

        let statement = (&mut *conn)
            .prepare(sql)
            .await
            .map_err(|e| DatabaseError::sql(sql, e))?;
        let fields: Vec<FieldMeta> = statement.columns().iter().map(field_meta).collect();
        debug!("Query has {} field(s): {}", fields.len(), sql);

        let rows = match mode {
            FetchMode::Buffered => {
                let rows = sqlx::query(sql)
                    .persistent(false)
                    .fetch_all(&mut *conn)
                    .await
                    .map_err(|e| DatabaseError::sql(sql, e))?;
                let decoded = rows
                    .iter()
                    .map(decode_row)
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| DatabaseError::sql(sql, e))?;
                stream::iter(decoded.into_iter().map(Ok)).boxed()
            }
            FetchMode::Streamed => sqlx::query(sql)
                .persistent(false)
                .fetch(conn)
                .map(move |row| {
                    row.and_then(|r| decode_row(&r))
                        .map_err(|e| DatabaseError::sql(sql, e))
                })
                .boxed(),
        };

        Ok(QueryResult { fields, rows })
    }

    async fn describe_table(&mut self, table: &str) -> Result<Vec<FieldMeta>, DatabaseError> {
        let rows = sqlx::query(TABLE_INFO_SQL)
            .bind(table)
            .fetch_all(&mut *self.conn)
            .await
            .map_err(|e| DatabaseError::sql(format!("PRAGMA table_info({})", table), e))?;

        rows.iter()
            .map(|row| {
                let name: String = row.try_get("name")?;
                let declared: String = row.try_get("type")?;
                let pk: i64 = row.try_get("pk")?;
                Ok(FieldMeta::from_declared(name, &declared, pk > 0))
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(|e| DatabaseError::sql(format!("PRAGMA table_info({})", table), e))
    }

    async fn list_tables(&mut self) -> Result<Vec<String>, DatabaseError> {
        sqlx::query_scalar::<_, String>(LIST_TABLES_SQL)
            .fetch_all(&mut *self.conn)
            .await
            .map_err(|e| DatabaseError::sql(LIST_TABLES_SQL, e))
    }

    /// Reads the query plan: every `OpenRead` on the main database names the
    /// root page of a table or of one of its indexes.
    async fn source_tables(&mut self, sql: &str) -> Result<Vec<String>, DatabaseError> {
        let explain = format!("EXPLAIN {}", sql);
        let plan = sqlx::query(&explain)
            .persistent(false)
            .fetch_all(&mut *self.conn)
            .await
            .map_err(|e| DatabaseError::sql(explain.as_str(), e))?;

        let mut pages = Vec::new();
        for step in &plan {
            let opcode: String = step
                .try_get_unchecked("opcode")
                .map_err(|e| DatabaseError::sql(explain.as_str(), e))?;
            let root: i64 = step
                .try_get_unchecked("p2")
                .map_err(|e| DatabaseError::sql(explain.as_str(), e))?;
            let schema: i64 = step
                .try_get_unchecked("p3")
                .map_err(|e| DatabaseError::sql(explain.as_str(), e))?;
            if opcode == "OpenRead" && schema == 0 && !pages.contains(&root) {
                pages.push(root);
            }
        }

        let mut tables = Vec::new();
        for page in pages {
            let names = sqlx::query_scalar::<_, String>(TABLE_BY_ROOTPAGE_SQL)
                .bind(page)
                .fetch_all(&mut *self.conn)
                .await
                .map_err(|e| DatabaseError::sql(TABLE_BY_ROOTPAGE_SQL, e))?;
            tables.extend(names);
        }
        tables.sort();
        tables.dedup();
        debug!("Statement reads {:?}: {}", tables, sql);
        Ok(tables)
    }
}
