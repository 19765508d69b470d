//! Per-fingerprint running statistics

use super::extractor::QueryEvent;
use std::collections::HashMap;

/// Largest duration total the store can hold (SQLite integers are `i64`).
pub const MAX_DURATION_MS: u64 = i64::MAX as u64;

/// Running statistics for one query fingerprint.
///
/// `namespace` and `command` are first-seen-wins: once set they are never
/// overwritten. `plan_summaries` gets one entry per occurrence, absent plans
/// included, so its length always equals `occurrence_count`.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRecord {
    pub fingerprint: String,
    pub total_duration_ms: u64,
    pub occurrence_count: u64,
    pub namespace: Option<String>,
    pub plan_summaries: Vec<Option<String>>,
    pub command: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregateError {
    DurationOverflow { fingerprint: String, duration_ms: u64 },
}

impl std::fmt::Display for AggregateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregateError::DurationOverflow { fingerprint, duration_ms } => write!(
                f,
                "Duration total overflow for {} (event duration {}ms)",
                fingerprint, duration_ms
            ),
        }
    }
}

impl std::error::Error for AggregateError {}

impl AggregateRecord {
    pub fn new(fingerprint: String) -> Self {
        Self {
            fingerprint,
            total_duration_ms: 0,
            occurrence_count: 0,
            namespace: None,
            plan_summaries: Vec::new(),
            command: None,
        }
    }

    /// Mean duration, derived from the totals on every read.
    pub fn mean_duration_ms(&self) -> f64 {
        if self.occurrence_count == 0 {
            0.0
        } else {
            self.total_duration_ms as f64 / self.occurrence_count as f64
        }
    }

    /// Merge one event into this record.
    ///
    /// The record is left untouched when the event is rejected.
    pub fn apply(&mut self, event: QueryEvent) -> Result<(), AggregateError> {
        let duration_ms = event.duration_ms.unwrap_or(0);
        let total_duration_ms = self
            .total_duration_ms
            .checked_add(duration_ms)
            .filter(|total| *total <= MAX_DURATION_MS)
            .ok_or_else(|| AggregateError::DurationOverflow {
                fingerprint: event.fingerprint.clone(),
                duration_ms,
            })?;

        self.total_duration_ms = total_duration_ms;
        self.occurrence_count += 1;

        if self.namespace.is_none() {
            self.namespace = event.namespace;
        }

        self.plan_summaries.push(event.plan_summary);

        if self.command.is_none() {
            self.command = event.command;
        }

        Ok(())
    }
}

/// Holds exactly one `AggregateRecord` per fingerprint for a whole run.
///
/// Records are kept in first-seen order so a flush is deterministic.
#[derive(Debug, Default)]
pub struct FingerprintAggregator {
    records: Vec<AggregateRecord>,
    index: HashMap<String, usize>,
}

impl FingerprintAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, event: QueryEvent) -> Result<(), AggregateError> {
        if let Some(&idx) = self.index.get(&event.fingerprint) {
            return self.records[idx].apply(event);
        }

        // Build the record off to the side so a rejected first event never
        // leaves a zero-count entry behind.
        let mut record = AggregateRecord::new(event.fingerprint.clone());
        record.apply(event)?;

        self.index.insert(record.fingerprint.clone(), self.records.len());
        self.records.push(record);
        Ok(())
    }

    pub fn get(&self, fingerprint: &str) -> Option<&AggregateRecord> {
        self.index.get(fingerprint).map(|&idx| &self.records[idx])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn total_occurrences(&self) -> u64 {
        self.records.iter().map(|r| r.occurrence_count).sum()
    }

    pub fn records(&self) -> &[AggregateRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<AggregateRecord> {
        self.records
    }
}
