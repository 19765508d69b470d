//! Analyzer Core - Slow Query Extraction and Aggregation Engine
//!
//! Turns a finished MongoDB structured log into one running-statistics record
//! per query fingerprint, persists them, and reads them back for reporting.
//!
//! # Architecture
//!
//! ```text
//! mongod.log → LogReader → decode_line → extract_query_event
//!     ↓
//! FingerprintAggregator (one record per fingerprint, single pass)
//!     ↓
//! SqliteAggregateStore (dropped and rebuilt every run)
//!     ↓
//! SqliteReportReader (count/plan filters, sort, limit)
//! ```

pub mod aggregator;
pub mod decoder;
pub mod extractor;
pub mod ingest;
pub mod reader;
pub mod sqlite_reader;
pub mod sqlite_store;
pub mod store_backend;

pub use aggregator::{AggregateError, AggregateRecord, FingerprintAggregator};
pub use decoder::{decode_line, DecodedRecord};
pub use extractor::{extract_query_event, ExtractError, QueryEvent};
pub use ingest::{ingest_lines, IngestStats, Ingestor};
pub use reader::LogReader;
pub use sqlite_reader::SqliteReportReader;
pub use sqlite_store::{persist_all, SqliteAggregateStore};
pub use store_backend::{AggregateStoreBackend, StoreError};
