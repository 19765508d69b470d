//! Connection tuning shared by every store handle

use rusqlite::Connection;

/// Apply the PRAGMAs used for the aggregate store.
///
/// The store is rebuilt from scratch on every run and has a single writer,
/// so durability is traded for bulk insert speed.
pub fn apply_optimized_pragmas(conn: &Connection) -> rusqlite::Result<()> {
    // journal_mode reports the mode it switched to
    let _mode: String = conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "temp_store", "MEMORY")?;
    conn.pragma_update(None, "cache_size", -16_000)?;
    conn.pragma_update(None, "wal_autocheckpoint", 1000)?;
    Ok(())
}
