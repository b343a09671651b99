//! # Store Handle
//!
//! Opens the on-device SQLite file and hands out repositories.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  DbConfig::new(path)  or  DbConfig::in_memory()                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config)                                                  │
//! │       ├── create the data directory                                     │
//! │       ├── WAL journal, NORMAL sync, foreign keys, busy timeout          │
//! │       ├── SqlitePool (a few connections, one for :memory:)              │
//! │       └── apply pending migrations                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.carts()        ──► CartRepository                                   │
//! │  db.preferences()  ──► PreferencesRepository                            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! One shopper drives the store, so contention is limited to the odd
//! overlapping read. WAL keeps the last committed cart if the process dies
//! mid-write.

use std::path::{Path, PathBuf};
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::cart::CartRepository;
use crate::repository::preferences::PreferencesRepository;

// =============================================================================
// Configuration
// =============================================================================

/// Where the store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// A database file, created on first use.
    File(PathBuf),
    /// Private in-memory database, gone when the pool closes.
    Memory,
}

/// Store settings.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub location: StoreLocation,

    /// Pool size. Default: 4
    pub max_connections: u32,

    /// How long a statement waits on a locked database. Default: 5 s
    pub busy_timeout: Duration,

    /// Apply pending migrations on open. Default: true
    pub migrate: bool,
}

impl DbConfig {
    /// File-backed store at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            location: StoreLocation::File(path.into()),
            max_connections: 4,
            busy_timeout: Duration::from_secs(5),
            migrate: true,
        }
    }

    /// In-memory store for tests.
    ///
    /// Limited to one connection: every SQLite `:memory:` connection would
    /// otherwise see its own empty database.
    pub fn in_memory() -> Self {
        DbConfig {
            location: StoreLocation::Memory,
            max_connections: 1,
            busy_timeout: Duration::from_secs(1),
            migrate: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn migrate(mut self, migrate: bool) -> Self {
        self.migrate = migrate;
        self
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = match &self.location {
            StoreLocation::File(path) => {
                ensure_parent_dir(path)?;
                SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal)
            }
            StoreLocation::Memory => SqliteConnectOptions::new().in_memory(true),
        };

        Ok(options
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(self.busy_timeout))
    }
}

fn ensure_parent_dir(path: &Path) -> DbResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .map_err(|e| DbError::Open(format!("{}: {e}", parent.display()))),
        _ => Ok(()),
    }
}

// =============================================================================
// Database
// =============================================================================

/// Handle on the local store. Clones share one pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the store described by `config`.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(location = ?config.location, "Opening local store");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(config.connect_options()?)
            .await
            .map_err(|e| DbError::Open(e.to_string()))?;
        debug!(max_connections = config.max_connections, "Pool ready");

        let db = Database { pool };
        if config.migrate {
            migrations::apply(&db.pool).await?;
        }
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn carts(&self) -> CartRepository {
        CartRepository::new(self.pool.clone())
    }

    pub fn preferences(&self) -> PreferencesRepository {
        PreferencesRepository::new(self.pool.clone())
    }

    /// Waits for open connections to finish, then closes the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// True when a trivial query still succeeds.
    pub async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_store_is_migrated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.ping().await);
        let applied = migrations::applied_count(db.pool()).await.unwrap();
        assert_eq!(applied, migrations::known_count());
    }

    #[tokio::test]
    async fn test_migrations_can_be_skipped() {
        let db = Database::new(DbConfig::in_memory().migrate(false))
            .await
            .unwrap();

        let carts = sqlx::query("SELECT 1 FROM carts").execute(db.pool()).await;
        assert!(carts.is_err());
    }

    #[tokio::test]
    async fn test_closed_store() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;
        assert!(!db.ping().await);
    }

    #[tokio::test]
    async fn test_file_store_creates_directory() {
        let dir = std::env::temp_dir().join(format!("velmo-store-{}", uuid::Uuid::new_v4()));
        let path = dir.join("nested").join("velmo.db");

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        assert!(path.exists());

        db.close().await;
        let _ = std::fs::remove_dir_all(dir);
    }
}
