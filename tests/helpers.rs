// Shared test helpers for database setup and export configuration.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::path::{Path, PathBuf};

use sqlx::SqlitePool;
use tempfile::TempDir;

use db_json_export::{Config, LogFormat, LogLevel, StatsLevel};

/// A scratch SQLite database and output directory, removed on drop.
pub struct TestDb {
    pub dir: TempDir,
    pub db_path: PathBuf,
    pub pool: SqlitePool,
}

impl TestDb {
    /// Creates an empty database file in a fresh temp directory.
    pub async fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = dir.path().join("test.db");
        std::fs::File::create(&db_path).expect("Failed to create database file");
        let pool = SqlitePool::connect(&format!("sqlite:{}", db_path.display()))
            .await
            .expect("Failed to create test database");
        Self { dir, db_path, pool }
    }

    /// Runs each statement in order.
    pub async fn execute_all(&self, statements: &[&str]) {
        for sql in statements {
            sqlx::query(sql)
                .execute(&self.pool)
                .await
                .unwrap_or_else(|e| panic!("Failed to run {sql}: {e}"));
        }
    }

    /// Creates `name(id INTEGER PRIMARY KEY, note TEXT)` holding `rows` rows
    /// with ids `1..=rows`.
    #[allow(dead_code)] // Used by other test files
    pub async fn create_numbered_table(&self, name: &str, rows: u64) {
        self.execute_all(&[&format!(
            "CREATE TABLE {name} (id INTEGER PRIMARY KEY, note TEXT)"
        )])
        .await;
        for id in 1..=rows {
            sqlx::query(&format!("INSERT INTO {name} (id, note) VALUES (?1, ?2)"))
                .bind(id as i64)
                .bind(format!("row {id}"))
                .execute(&self.pool)
                .await
                .expect("Failed to insert row");
        }
    }

    /// Output directory for per-table files.
    pub fn out_dir(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    /// Config pointing at this database and [`TestDb::out_dir`].
    pub fn config(&self) -> Config {
        Config {
            database_url: format!("sqlite:{}", self.db_path.display()),
            directory: self.out_dir(),
            log_level: LogLevel::Error, // Reduce noise in tests
            log_format: LogFormat::Plain,
            stats: StatsLevel::None,
            ..Default::default()
        }
    }
}

/// Reads an output file into a string.
#[allow(dead_code)]
pub fn read_output(path: &Path) -> String {
    std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.display()))
}

/// Parses line-delimited JSON output into values.
#[allow(dead_code)]
pub fn parse_lines(text: &str) -> Vec<serde_json::Value> {
    text.lines()
        .map(|line| serde_json::from_str(line).expect("Each line is a JSON object"))
        .collect()
}
