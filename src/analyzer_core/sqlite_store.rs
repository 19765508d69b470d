//! SQLite aggregate store
//!
//! One row per fingerprint in `slow_queries`. The database file is dropped
//! and recreated on every run, so its contents always reflect exactly one
//! input log.

use super::aggregator::AggregateRecord;
use super::store_backend::{AggregateStoreBackend, StoreError};
use crate::sqlite_pragma::apply_optimized_pragmas;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

pub const TABLE_NAME: &str = "slow_queries";

/// Column names in table order. Report headers use these verbatim.
pub const COLUMNS: [&str; 7] = [
    "fingerprint",
    "total_duration_ms",
    "occurrence_count",
    "mean_duration_ms",
    "namespace",
    "plan_summaries",
    "command",
];

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS slow_queries (
    fingerprint TEXT PRIMARY KEY,
    total_duration_ms INTEGER NOT NULL,
    occurrence_count INTEGER NOT NULL,
    mean_duration_ms REAL NOT NULL,
    namespace TEXT,
    plan_summaries TEXT NOT NULL,
    command TEXT
)";

pub struct SqliteAggregateStore {
    conn: Connection,
    path: PathBuf,
    replaced_previous: bool,
    batch: Vec<AggregateRecord>,
    batch_size: usize,
    rows_written: u64,
}

impl SqliteAggregateStore {
    /// Create a fresh store at `db_path`, discarding any previous database
    /// file (and its WAL side files) found there.
    pub fn create(db_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = db_path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let replaced_previous = drop_existing(&path)?;

        let conn = Connection::open(&path).map_err(|source| StoreError::Open {
            path: path.clone(),
            source,
        })?;
        apply_optimized_pragmas(&conn)?;
        conn.execute(CREATE_TABLE_SQL, [])?;

        log::info!("✅ SQLite store initialized: {}", path.display());

        Ok(Self {
            conn,
            path,
            replaced_previous,
            batch: Vec::with_capacity(500),
            batch_size: 500,
            rows_written: 0,
        })
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `create` discarded an existing database file.
    pub fn replaced_previous(&self) -> bool {
        self.replaced_previous
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Flush anything pending and release the connection.
    pub fn close(mut self) -> Result<(), StoreError> {
        self.flush_batch()?;
        self.conn.close().map_err(|(_, e)| StoreError::from(e))
    }

    fn flush_batch(&mut self) -> Result<(), StoreError> {
        if self.batch.is_empty() {
            return Ok(());
        }

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT OR REPLACE INTO slow_queries
                 (fingerprint, total_duration_ms, occurrence_count, mean_duration_ms,
                  namespace, plan_summaries, command)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;

            for record in &self.batch {
                let plan_summaries = serde_json::to_string(&record.plan_summaries).map_err(|source| {
                    StoreError::EncodePlans {
                        fingerprint: record.fingerprint.clone(),
                        source,
                    }
                })?;
                stmt.execute(params![
                    record.fingerprint,
                    record.total_duration_ms,
                    record.occurrence_count,
                    record.mean_duration_ms(),
                    record.namespace,
                    plan_summaries,
                    record.command,
                ])?;
            }
        }
        tx.commit()?;

        self.rows_written += self.batch.len() as u64;
        log::debug!("✅ Flushed {} aggregates to SQLite", self.batch.len());
        self.batch.clear();

        Ok(())
    }
}

/// Remove a previous database and its side files. Returns whether a
/// database file was there.
fn drop_existing(path: &Path) -> Result<bool, StoreError> {
    let remove = |file: &Path| {
        std::fs::remove_file(file).map_err(|source| StoreError::DropPrevious {
            path: file.to_path_buf(),
            source,
        })
    };

    let existed = path.exists();
    if existed {
        remove(path)?;
        log::info!("🗑️  Dropped previous store: {}", path.display());
    }

    for suffix in ["-wal", "-shm"] {
        let mut side = path.as_os_str().to_owned();
        side.push(suffix);
        let side = PathBuf::from(side);
        if side.exists() {
            remove(&side)?;
        }
    }

    Ok(existed)
}

#[async_trait]
impl AggregateStoreBackend for SqliteAggregateStore {
    async fn write(&mut self, record: &AggregateRecord) -> Result<(), StoreError> {
        self.batch.push(record.clone());

        if self.batch.len() >= self.batch_size {
            self.flush_batch()?;
        }

        Ok(())
    }

    async fn flush(&mut self) -> Result<(), StoreError> {
        self.flush_batch()
    }

    fn backend_type(&self) -> &'static str {
        "SQLite"
    }
}

/// Write every record to the store and flush.
pub async fn persist_all<B>(backend: &mut B, records: &[AggregateRecord]) -> Result<(), StoreError>
where
    B: AggregateStoreBackend + ?Sized,
{
    for record in records {
        backend.write(record).await?;
    }
    backend.flush().await?;

    log::info!("💾 Persisted {} aggregates ({})", records.len(), backend.backend_type());
    Ok(())
}
