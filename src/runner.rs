//! One complete run: ingest the log, rebuild the store, select the report

use crate::analyzer_core::{
    persist_all, IngestStats, Ingestor, LogReader, SqliteAggregateStore, SqliteReportReader,
};
use crate::error::AnalyzerError;
use crate::report::{ReportOptions, ReportRow};
use std::path::Path;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub stats: IngestStats,
    pub fingerprints: usize,
    pub replaced_previous: bool,
    pub elapsed: Duration,
}

/// Aggregate every slow query in `log_path` into a fresh store at `db_path`.
///
/// The input file and the store handle are both released before this
/// returns, on success and on error.
pub async fn analyze(log_path: &Path, db_path: &Path) -> Result<RunSummary, AnalyzerError> {
    let started = Instant::now();

    let mut reader = match LogReader::open(log_path).await {
        Ok(reader) => reader,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AnalyzerError::InputNotFound(log_path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    let mut ingestor = Ingestor::new();
    ingestor.ingest(&mut reader).await?;
    drop(reader);

    let (aggregator, stats) = ingestor.finish();
    let fingerprints = aggregator.len();

    let mut store = SqliteAggregateStore::create(db_path)?;
    let replaced_previous = store.replaced_previous();
    persist_all(&mut store, aggregator.records()).await?;
    store.close()?;

    let summary = RunSummary {
        stats,
        fingerprints,
        replaced_previous,
        elapsed: started.elapsed(),
    };
    log_summary(&summary);

    Ok(summary)
}

/// Read the report rows back from a finished store.
pub fn select_report(db_path: &Path, options: &ReportOptions) -> Result<Vec<ReportRow>, AnalyzerError> {
    let reader = SqliteReportReader::open(db_path)?;
    Ok(reader.select(options)?)
}

fn log_summary(summary: &RunSummary) {
    let stats = &summary.stats;
    log::info!("✅ Ingestion complete in {:.2?}", summary.elapsed);
    log::info!("   Lines read: {}", stats.lines_read);
    log::info!("   Undecodable lines: {}", stats.decode_failures);
    log::info!("   Other records: {}", stats.not_applicable);
    log::info!("   Extraction failures: {}", stats.extraction_failures);
    log::info!("   Aggregation failures: {}", stats.aggregation_failures);
    log::info!("   Slow queries aggregated: {}", stats.events_aggregated);
    log::info!("   Distinct fingerprints: {}", summary.fingerprints);
}
