//! Slow Query Log Analyzer
//!
//! Aggregates the "Slow query" events of a MongoDB structured log by query
//! fingerprint, stores one row per fingerprint in SQLite, and prints the
//! slowest queries as a table.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin slowlog -- /var/log/mongod.log --collscan --limit 20
//! cargo run --release --bin slowlog -- --sql
//! ```
//!
//! ## Environment Variables
//!
//! - SLOWLOG_LOG_PATH - Log file to analyze (default: /var/log/mongod.log)
//! - SLOWLOG_DB_PATH - SQLite database path (default: ./mongo_slow_logs.sql)
//! - SLOWLOG_LIMIT / SLOWLOG_CHAR_LIMIT / SLOWLOG_MIN_COUNT - report shaping
//! - SLOWLOG_PLAN_CONTAINS - plan summary substring filter
//! - SLOWLOG_SORT - mean, total or count (default: mean)
//! - RUST_LOG - Logging level (optional, default: info)

use clap::Parser;
use slowlog_analyzer::report::{render_table, sql_hints};
use slowlog_analyzer::{analyze, select_report, AnalyzerError, Config};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let config = Config::parse();
    let options = config.report_options();

    if config.sql {
        print!("{}", sql_hints(&config.db, &options));
        return ExitCode::SUCCESS;
    }

    log::info!("🚀 Starting slow query analysis");
    log::info!("   Log: {}", config.log.display());
    log::info!("   Database: {}", config.db.display());
    log::info!(
        "   Report: sort={} min_count={} plan_filter={} limit={} char_limit={}",
        options.sort_key.column(),
        options.min_count,
        options.plan_contains.as_deref().unwrap_or("none"),
        options.limit,
        options.char_limit
    );

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(AnalyzerError::InputNotFound(path)) => {
            eprintln!("The file '{}' does not exist.", path.display());
            ExitCode::FAILURE
        }
        Err(e) => {
            log::error!("❌ Analysis failed: {}", e);
            eprintln!("An error occurred: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &Config) -> Result<(), AnalyzerError> {
    let summary = analyze(&config.log, &config.db).await?;
    if summary.replaced_previous {
        println!("Old database file {} has been dropped", config.db.display());
    }

    let rows = select_report(&config.db, &config.report_options())?;
    println!("{}", render_table(&rows));

    Ok(())
}
