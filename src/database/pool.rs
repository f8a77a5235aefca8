//! Connection pool setup.

use std::str::FromStr;
use std::time::Duration;

use log::{error, info};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::error_handling::DatabaseError;

/// Workers wait for a free connection as long as other tables take to export.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Opens a SQLite pool for `database_url`.
///
/// The database must already exist; an exporter never creates one. Connections
/// are handed to workers, so `max_connections` bounds how many tables are read
/// at once (at least two, one being the main session).
///
/// # Errors
///
/// Returns `DatabaseError::ConnectError` if the URL is invalid or the database
/// cannot be opened.
pub async fn init_pool(
    database_url: &str,
    max_connections: u32,
) -> Result<SqlitePool, DatabaseError> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| {
            error!("Invalid database URL {}: {e}", database_url);
            DatabaseError::ConnectError(e)
        })?
        .create_if_missing(false);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections.max(2))
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_with(options)
        .await
        .map_err(|e| {
            error!("Failed to connect to database: {e}");
            DatabaseError::ConnectError(e)
        })?;

    info!("Connected to {}", database_url);
    Ok(pool)
}
