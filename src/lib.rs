pub mod analyzer_core;
pub mod config;
pub mod error;
pub mod report;
pub mod runner;
pub mod sqlite_pragma;

pub use config::Config;
pub use error::AnalyzerError;
pub use report::{ReportOptions, ReportRow, SortKey};
pub use runner::{analyze, select_report, RunSummary};
