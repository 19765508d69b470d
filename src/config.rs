//! Command line and environment configuration
//!
//! Every option can also come from an environment variable (or a `.env`
//! file loaded by the binary); flags win over the environment.

use crate::report::{ReportOptions, SortKey};
use clap::Parser;
use std::path::PathBuf;

pub const COLLSCAN: &str = "COLLSCAN";

#[derive(Debug, Clone, Parser)]
#[command(name = "slowlog", version, about = "Process MongoDB slow log file", long_about = None)]
pub struct Config {
    /// Path to the mongodb log file
    #[arg(default_value = "/var/log/mongod.log", env = "SLOWLOG_LOG_PATH")]
    pub log: PathBuf,

    /// Path to the SQLite database file
    #[arg(long, default_value = "./mongo_slow_logs.sql", env = "SLOWLOG_DB_PATH")]
    pub db: PathBuf,

    /// Limit the number of rows in the report
    #[arg(long, default_value_t = 10, env = "SLOWLOG_LIMIT")]
    pub limit: usize,

    /// Limit the number of characters of plan summary and command text
    #[arg(long, default_value_t = 100, env = "SLOWLOG_CHAR_LIMIT")]
    pub char_limit: usize,

    /// Filter queries that appear less than this count in the log
    #[arg(long, default_value_t = 1, env = "SLOWLOG_MIN_COUNT")]
    pub count: u64,

    /// Only report queries that ran with a COLLSCAN plan (overrides --plan-contains)
    #[arg(long)]
    pub collscan: bool,

    /// Only report queries with a plan summary containing this text
    #[arg(long, value_name = "TEXT", env = "SLOWLOG_PLAN_CONTAINS")]
    pub plan_contains: Option<String>,

    /// Column to sort the report by, descending
    #[arg(long, value_enum, default_value_t = SortKey::Mean, env = "SLOWLOG_SORT")]
    pub sort: SortKey,

    /// Print useful SQL statements for the database and exit
    #[arg(long)]
    pub sql: bool,
}

impl Config {
    pub fn plan_filter(&self) -> Option<String> {
        if self.collscan {
            Some(COLLSCAN.to_string())
        } else {
            self.plan_contains.clone().filter(|s| !s.is_empty())
        }
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            min_count: self.count,
            plan_contains: self.plan_filter(),
            sort_key: self.sort,
            limit: self.limit,
            char_limit: self.char_limit,
        }
    }
}
