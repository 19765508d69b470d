//! Read-only access to a finished aggregate store

use super::aggregator::AggregateRecord;
use super::store_backend::StoreError;
use crate::report::{truncate_chars, ReportOptions, ReportRow};
use rusqlite::{params, Connection};
use std::path::Path;

pub struct SqliteReportReader {
    conn: Connection,
}

impl SqliteReportReader {
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = db_path.as_ref();
        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        // Reports never write
        conn.execute_batch("PRAGMA query_only = ON")?;

        Ok(Self { conn })
    }

    /// Select report rows: count filter, optional plan substring filter,
    /// descending sort on the chosen key, then the row limit.
    ///
    /// Ties keep storage order.
    pub fn select(&self, options: &ReportOptions) -> Result<Vec<ReportRow>, StoreError> {
        let sql = format!(
            "SELECT fingerprint, total_duration_ms, occurrence_count, mean_duration_ms,
                    namespace, plan_summaries, command
             FROM slow_queries
             WHERE occurrence_count >= ?1
               AND (?2 IS NULL OR EXISTS (
                    SELECT 1 FROM json_each(slow_queries.plan_summaries) AS plan
                    WHERE instr(plan.value, ?2) > 0))
             ORDER BY {} DESC, rowid ASC
             LIMIT ?3",
            options.sort_key.column()
        );

        let min_count = i64::try_from(options.min_count).unwrap_or(i64::MAX);
        let limit = i64::try_from(options.limit).unwrap_or(i64::MAX);
        let char_limit = options.char_limit;

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![min_count, options.plan_contains.as_deref(), limit],
            |row| {
                let namespace: Option<String> = row.get(4)?;
                let plan_summaries: String = row.get(5)?;
                let command: Option<String> = row.get(6)?;

                Ok(ReportRow {
                    fingerprint: row.get(0)?,
                    total_duration_ms: row.get(1)?,
                    occurrence_count: row.get(2)?,
                    mean_duration_ms: row.get(3)?,
                    namespace: namespace.unwrap_or_default(),
                    plan_summaries: truncate_chars(&plan_summaries, char_limit),
                    command: truncate_chars(command.as_deref().unwrap_or(""), char_limit),
                })
            },
        )?;

        let rows = rows.collect::<Result<Vec<_>, _>>()?;
        log::debug!("📊 Report selected {} rows", rows.len());
        Ok(rows)
    }

    /// Every stored aggregate, in storage order.
    pub fn fetch_all(&self) -> Result<Vec<AggregateRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT fingerprint, total_duration_ms, occurrence_count, namespace, plan_summaries, command
             FROM slow_queries
             ORDER BY rowid ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, Option<String>>(5)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (fingerprint, total, count, namespace, plans, command) = row?;
            records.push(AggregateRecord {
                total_duration_ms: total.max(0) as u64,
                occurrence_count: count.max(0) as u64,
                namespace,
                plan_summaries: serde_json::from_str(&plans).map_err(|source| StoreError::DecodePlans {
                    fingerprint: fingerprint.clone(),
                    source,
                })?,
                fingerprint,
                command,
            });
        }

        Ok(records)
    }

    /// Stored mean for one fingerprint.
    pub fn mean_duration_ms(&self, fingerprint: &str) -> Result<Option<f64>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT mean_duration_ms FROM slow_queries WHERE fingerprint = ?1")?;
        let mut rows = stmt.query(params![fingerprint])?;

        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }
}
