//! Connection pools for the five SQLite store files.

use std::path::{Path, PathBuf};
use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use thiserror::Error;

use crate::domain::types::{Catalog, StoreKind};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

pub const PERSONNEL_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/personnel");
pub const CATALOG_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/catalog");
pub const ALERT_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/alerts");

/// Seconds a connection waits on a locked database before giving up.
const BUSY_TIMEOUT_MS: u32 = 20_000;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("failed to prepare database directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to build connection pool: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("failed to run migrations for {store}: {message}")]
    Migration { store: StoreKind, message: String },
    #[error("invalid database path: {0}")]
    InvalidPath(PathBuf),
}

/// Pragmas applied to every pooled connection.
#[derive(Debug, Clone, Copy)]
struct SqlitePragmas {
    write_ahead_log: bool,
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        let mut pragmas =
            format!("PRAGMA busy_timeout = {BUSY_TIMEOUT_MS}; PRAGMA foreign_keys = ON;");
        if self.write_ahead_log {
            pragmas.push_str(" PRAGMA journal_mode = WAL;");
        }
        conn.batch_execute(&pragmas)
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

fn migrations_for(kind: StoreKind) -> EmbeddedMigrations {
    match kind {
        StoreKind::Personnel => PERSONNEL_MIGRATIONS,
        StoreKind::Chemicals | StoreKind::Warehouse | StoreKind::Postharvest => {
            CATALOG_MIGRATIONS
        }
        StoreKind::Alerts => ALERT_MIGRATIONS,
    }
}

/// Opens a pool for one store file and brings its schema up to date.
///
/// The personnel store runs in WAL mode so readers are not blocked while the
/// attendance engine writes.
pub fn establish_store(path: &Path, kind: StoreKind) -> Result<DbPool, DbError> {
    let url = path
        .to_str()
        .ok_or_else(|| DbError::InvalidPath(path.to_path_buf()))?;
    let manager = ConnectionManager::<SqliteConnection>::new(url);
    let pool = Pool::builder()
        .connection_timeout(Duration::from_secs(20))
        .connection_customizer(Box::new(SqlitePragmas {
            write_ahead_log: kind == StoreKind::Personnel,
        }))
        .build(manager)?;

    let mut conn = pool.get()?;
    conn.run_pending_migrations(migrations_for(kind))
        .map_err(|e| DbError::Migration {
            store: kind,
            message: e.to_string(),
        })?;

    Ok(pool)
}

/// The five independent store pools, passed explicitly to whoever needs them.
#[derive(Clone)]
pub struct Stores {
    pub personnel: DbPool,
    pub chemicals: DbPool,
    pub warehouse: DbPool,
    pub postharvest: DbPool,
    pub alerts: DbPool,
}

impl Stores {
    /// Opens (creating when missing) every store under `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, DbError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let open = |kind: StoreKind| establish_store(&dir.join(kind.file_name()), kind);

        Ok(Self {
            personnel: open(StoreKind::Personnel)?,
            chemicals: open(StoreKind::Chemicals)?,
            warehouse: open(StoreKind::Warehouse)?,
            postharvest: open(StoreKind::Postharvest)?,
            alerts: open(StoreKind::Alerts)?,
        })
    }

    pub fn pool(&self, kind: StoreKind) -> &DbPool {
        match kind {
            StoreKind::Personnel => &self.personnel,
            StoreKind::Chemicals => &self.chemicals,
            StoreKind::Warehouse => &self.warehouse,
            StoreKind::Postharvest => &self.postharvest,
            StoreKind::Alerts => &self.alerts,
        }
    }

    pub fn catalog(&self, catalog: Catalog) -> &DbPool {
        self.pool(catalog.into())
    }
}
