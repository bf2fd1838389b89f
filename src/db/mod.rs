use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use tracing::{debug, info};

use crate::config::DatabaseConfig;

mod chats;
mod files;
mod lessons;
mod users;

// Type alias for the database connection pool
pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = r2d2::PooledConnection<SqliteConnectionManager>;

const MIGRATIONS: &[(&str, &str)] = &[
    (
        "2026-10-01-000000_create_tables",
        include_str!("../../migrations/2026-10-01-000000_create_tables/up.sql"),
    ),
    (
        "2026-10-01-000001_create_chats",
        include_str!("../../migrations/2026-10-01-000001_create_chats/up.sql"),
    ),
    (
        "2026-10-01-000002_create_files",
        include_str!("../../migrations/2026-10-01-000002_create_files/up.sql"),
    ),
];

/// Database manager for handling connections and operations.
///
/// Repository methods live in the `users`, `lessons`, `chats` and `files`
/// submodules as further `impl Database` blocks.
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Create a new database connection pool and run migrations.
    ///
    /// `database_url` may be a bare path or carry a `sqlite:` / `sqlite://` prefix.
    pub fn new(database_url: &str, max_connections: u32, connection_timeout: Duration) -> Result<Self> {
        let path = strip_sqlite_prefix(database_url);

        // Create parent directory if it doesn't exist
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create database directory {}", parent.display()))?;
            }
        }

        let manager = SqliteConnectionManager::file(path)
            .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;"));
        let pool = Pool::builder()
            .max_size(max_connections)
            .connection_timeout(connection_timeout)
            .build(manager)
            .context("Failed to create database connection pool")?;

        let conn = pool.get()?;
        Self::run_migrations(&conn)?;

        info!(path, max_connections, "Database ready");
        Ok(Self { pool })
    }

    /// Open a database from the `[database]` config section
    pub fn from_config(config: &DatabaseConfig) -> Result<Self> {
        Self::new(
            &config.path,
            config.max_connections,
            Duration::from_secs(config.connection_timeout_secs),
        )
    }

    /// Open a database with pool defaults, handy in tests and tooling
    pub fn open(database_url: &str) -> Result<Self> {
        Self::new(database_url, 4, Duration::from_secs(30))
    }

    /// Run database migrations
    fn run_migrations(conn: &Connection) -> Result<()> {
        for (name, sql) in MIGRATIONS {
            debug!(migration = name, "Applying migration");
            conn.execute_batch(sql)
                .with_context(|| format!("Failed to run migration {name}"))?;
        }
        Ok(())
    }

    /// Get a connection from the pool
    pub fn get_connection(&self) -> crate::error::Result<DbConnection> {
        Ok(self.pool.get()?)
    }
}

fn strip_sqlite_prefix(url: &str) -> &str {
    url.strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_sqlite_prefix() {
        assert_eq!(strip_sqlite_prefix("sqlite://data/app.db"), "data/app.db");
        assert_eq!(strip_sqlite_prefix("sqlite:data/app.db"), "data/app.db");
        assert_eq!(strip_sqlite_prefix("/tmp/app.db"), "/tmp/app.db");
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let url = dir.path().join("notebridge.db");
        let url = url.to_str().unwrap();
        Database::open(url).unwrap();
        // Second open re-runs every migration against the existing tables
        let db = Database::open(url).unwrap();
        assert!(db.get_connection().is_ok());
    }
}
