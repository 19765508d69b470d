use super::aggregator::AggregateRecord;
use async_trait::async_trait;
use std::path::PathBuf;

/// Failures while building or reading the aggregate store.
///
/// Path-bound variants name the file involved so a failed run points at
/// the database location rather than at a bare SQLite message.
#[derive(Debug)]
pub enum StoreError {
    CreateDir { path: PathBuf, source: std::io::Error },
    DropPrevious { path: PathBuf, source: std::io::Error },
    Open { path: PathBuf, source: rusqlite::Error },
    Sql(rusqlite::Error),
    EncodePlans { fingerprint: String, source: serde_json::Error },
    DecodePlans { fingerprint: String, source: serde_json::Error },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Sql(err)
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::CreateDir { path, source } => {
                write!(f, "Cannot create store directory {}: {}", path.display(), source)
            }
            StoreError::DropPrevious { path, source } => {
                write!(f, "Cannot remove previous store file {}: {}", path.display(), source)
            }
            StoreError::Open { path, source } => {
                write!(f, "Cannot open store {}: {}", path.display(), source)
            }
            StoreError::Sql(e) => write!(f, "Store query failed: {}", e),
            StoreError::EncodePlans { fingerprint, source } => {
                write!(f, "Cannot encode plan summaries of {}: {}", fingerprint, source)
            }
            StoreError::DecodePlans { fingerprint, source } => {
                write!(f, "Stored plan summaries of {} are not a JSON list: {}", fingerprint, source)
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::CreateDir { source, .. } | StoreError::DropPrevious { source, .. } => Some(source),
            StoreError::Open { source, .. } | StoreError::Sql(source) => Some(source),
            StoreError::EncodePlans { source, .. } | StoreError::DecodePlans { source, .. } => Some(source),
        }
    }
}

/// Durable keyed storage for the final per-fingerprint records.
#[async_trait]
pub trait AggregateStoreBackend: Send {
    /// Insert or replace the row for `record.fingerprint`
    async fn write(&mut self, record: &AggregateRecord) -> Result<(), StoreError>;

    /// Flush pending writes to storage
    async fn flush(&mut self) -> Result<(), StoreError>;

    /// Get backend type for logging
    fn backend_type(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_open_error_names_the_database() {
        let err = StoreError::Open {
            path: PathBuf::from("/data/slow.db"),
            source: rusqlite::Error::InvalidQuery,
        };

        let message = err.to_string();
        assert!(message.starts_with("Cannot open store /data/slow.db: "));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_plan_decode_error_names_the_fingerprint() {
        let source = serde_json::from_str::<Vec<Option<String>>>("not json").unwrap_err();
        let err = StoreError::DecodePlans {
            fingerprint: "3C7E9F21".to_string(),
            source,
        };

        assert!(err.to_string().contains("3C7E9F21"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_sqlite_errors_convert_to_query_failures() {
        let err: StoreError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, StoreError::Sql(rusqlite::Error::QueryReturnedNoRows)));
        assert!(err.to_string().starts_with("Store query failed: "));
    }
}
