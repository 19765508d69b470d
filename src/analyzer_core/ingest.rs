//! Single-pass ingestion: decode, classify, extract, aggregate

use super::aggregator::FingerprintAggregator;
use super::decoder::decode_line;
use super::extractor::extract_query_event;
use super::reader::LogReader;

/// Per-run diagnostic counters.
///
/// Every line read lands in exactly one of the outcome buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub lines_read: u64,
    pub decode_failures: u64,
    pub not_applicable: u64,
    pub extraction_failures: u64,
    pub aggregation_failures: u64,
    pub events_aggregated: u64,
}

/// Owns the aggregation state for one run and feeds lines through it.
#[derive(Debug, Default)]
pub struct Ingestor {
    aggregator: FingerprintAggregator,
    stats: IngestStats,
}

impl Ingestor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one raw line. Never fails: every per-line problem is counted
    /// and the line is skipped.
    pub fn process_line(&mut self, line_number: u64, line: &str) {
        self.stats.lines_read += 1;

        let Some(record) = decode_line(line) else {
            self.stats.decode_failures += 1;
            log::debug!("Line {}: not a structured record, skipped", line_number);
            return;
        };

        let event = match extract_query_event(&record) {
            Ok(Some(event)) => event,
            Ok(None) => {
                self.stats.not_applicable += 1;
                return;
            }
            Err(e) => {
                self.stats.extraction_failures += 1;
                log::warn!("⚠️  Line {}: slow query skipped: {}", line_number, e);
                return;
            }
        };

        match self.aggregator.update(event) {
            Ok(()) => self.stats.events_aggregated += 1,
            Err(e) => {
                self.stats.aggregation_failures += 1;
                log::warn!("⚠️  Line {}: slow query not aggregated: {}", line_number, e);
            }
        }
    }

    /// Drain a reader to the end of its input.
    pub async fn ingest(&mut self, reader: &mut LogReader) -> std::io::Result<()> {
        while let Some(line) = reader.read_line().await? {
            self.process_line(reader.line_number(), &line);
        }
        Ok(())
    }

    pub fn stats(&self) -> IngestStats {
        self.stats
    }

    pub fn aggregator(&self) -> &FingerprintAggregator {
        &self.aggregator
    }

    pub fn finish(self) -> (FingerprintAggregator, IngestStats) {
        (self.aggregator, self.stats)
    }
}

/// Ingest an in-memory sequence of lines.
pub fn ingest_lines<'a, I>(lines: I) -> (FingerprintAggregator, IngestStats)
where
    I: IntoIterator<Item = &'a str>,
{
    let mut ingestor = Ingestor::new();
    for (idx, line) in lines.into_iter().enumerate() {
        ingestor.process_line(idx as u64 + 1, line);
    }
    ingestor.finish()
}
