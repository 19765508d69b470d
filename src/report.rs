//! Report selection parameters, rows, and rendering

use crate::analyzer_core::sqlite_store::{COLUMNS, TABLE_NAME};
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

/// Column the report is sorted on, always descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortKey {
    #[default]
    Mean,
    Total,
    Count,
}

impl SortKey {
    pub fn column(&self) -> &'static str {
        match self {
            SortKey::Mean => "mean_duration_ms",
            SortKey::Total => "total_duration_ms",
            SortKey::Count => "occurrence_count",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    pub min_count: u64,
    /// Keep only fingerprints with at least one plan summary containing this
    pub plan_contains: Option<String>,
    pub sort_key: SortKey,
    pub limit: usize,
    pub char_limit: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            min_count: 1,
            plan_contains: None,
            sort_key: SortKey::Mean,
            limit: 10,
            char_limit: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Tabled)]
pub struct ReportRow {
    #[tabled(rename = "fingerprint")]
    pub fingerprint: String,
    #[tabled(rename = "total_duration_ms")]
    pub total_duration_ms: i64,
    #[tabled(rename = "occurrence_count")]
    pub occurrence_count: i64,
    #[tabled(rename = "mean_duration_ms", display_with = "format_mean")]
    pub mean_duration_ms: f64,
    #[tabled(rename = "namespace")]
    pub namespace: String,
    #[tabled(rename = "plan_summaries")]
    pub plan_summaries: String,
    #[tabled(rename = "command")]
    pub command: String,
}

impl ReportRow {
    /// Value of the column the report was sorted on.
    pub fn sort_value(&self, key: SortKey) -> f64 {
        match key {
            SortKey::Mean => self.mean_duration_ms,
            SortKey::Total => self.total_duration_ms as f64,
            SortKey::Count => self.occurrence_count as f64,
        }
    }
}

fn format_mean(mean: &f64) -> String {
    format!("{:.1}", mean)
}

/// First `limit` characters of `text`.
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

pub fn render_table(rows: &[ReportRow]) -> String {
    Table::new(rows).with(Style::modern()).to_string()
}

/// Statements for inspecting the store by hand with the sqlite3 shell.
pub fn sql_hints(db_path: &Path, options: &ReportOptions) -> String {
    let plan_condition = options
        .plan_contains
        .as_deref()
        .map(|needle| format!(" AND instr(plan_summaries, '{}') > 0", needle.replace('\'', "''")))
        .unwrap_or_default();

    let mut out = String::new();
    out.push_str(&format!("sqlite3 {}\n", db_path.display()));
    out.push_str(".mode column\n");
    out.push_str(&format!(
        "SELECT fingerprint, total_duration_ms, occurrence_count, mean_duration_ms, namespace, \
         SUBSTR(plan_summaries, 1, {limit_chars}), SUBSTR(command, 1, {limit_chars}) \
         FROM {table} WHERE occurrence_count >= {count}{plan_condition} \
         ORDER BY {sort} DESC LIMIT {limit};\n",
        limit_chars = options.char_limit,
        table = TABLE_NAME,
        count = options.min_count,
        plan_condition = plan_condition,
        sort = options.sort_key.column(),
        limit = options.limit,
    ));
    out.push_str(&format!(
        "SELECT {} FROM {} ORDER BY mean_duration_ms DESC;\n",
        COLUMNS.join(", "),
        TABLE_NAME
    ));
    out
}
