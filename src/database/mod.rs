//! Database capability used by the export engine.
//!
//! The engine talks to the database only through [`SqlSession`] (one
//! connection) and [`SessionFactory`] (opens connections for workers). The
//! SQLite implementation lives in [`sqlite`].

mod pool;
pub mod sqlite;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error_handling::DatabaseError;
use crate::schema::FieldMeta;
use crate::serialize::SourceRow;

pub use pool::init_pool;
pub use sqlite::{SqliteSession, SqliteSessionFactory};

/// How a query's rows are delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchMode {
    /// Fetch the whole batch before the first row is handed out.
    #[default]
    Buffered,
    /// Hand rows out as the driver produces them.
    Streamed,
}

/// Result of a query: field metadata and a stream of rows.
pub struct QueryResult<'a> {
    /// One entry per result column, in order.
    pub fields: Vec<FieldMeta>,
    /// Rows as nullable raw values.
    pub rows: BoxStream<'a, Result<SourceRow, DatabaseError>>,
}

/// One database connection.
#[async_trait]
pub trait SqlSession: Send {
    /// Runs a statement, discarding any result.
    async fn execute(&mut self, sql: &str) -> Result<(), DatabaseError>;

    /// Runs a query. The rows borrow the session until dropped.
    async fn query<'a>(
        &'a mut self,
        sql: &'a str,
        mode: FetchMode,
    ) -> Result<QueryResult<'a>, DatabaseError>;

    /// Declared columns of `table`, with primary key flags.
    async fn describe_table(&mut self, table: &str) -> Result<Vec<FieldMeta>, DatabaseError>;

    /// Names of all base tables, sorted.
    async fn list_tables(&mut self) -> Result<Vec<String>, DatabaseError>;

    /// Base tables a query reads from, sorted. Empty when the database
    /// cannot tell.
    async fn source_tables(&mut self, sql: &str) -> Result<Vec<String>, DatabaseError>;
}

/// Opens sessions, one per worker.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Opens a new session.
    async fn connect(&self) -> Result<Box<dyn SqlSession>, DatabaseError>;
}
