//! End-to-end runs: log file on disk → SQLite store → report rows
//!
//! Each test writes a small structured log into a temp dir, runs the full
//! analysis, and checks the store and the report read back from it.

#[cfg(test)]
mod end_to_end_tests {
    use slowlog_analyzer::analyzer_core::SqliteReportReader;
    use slowlog_analyzer::{analyze, select_report, AnalyzerError, ReportOptions, SortKey};
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn slow_query(hash: &str, duration: Option<u64>, plan: &str) -> String {
        let duration = duration
            .map(|d| format!(r#","durationMillis":{}"#, d))
            .unwrap_or_default();
        format!(
            r#"{{"t":{{"$date":"2024-03-01T10:00:00.000+00:00"}},"s":"I","c":"COMMAND","id":51803,"ctx":"conn7","msg":"Slow query","attr":{{"type":"command","ns":"shop.orders","command":{{"find":"orders","filter":{{"status":"open"}}}},"planSummary":"{}","queryHash":"{}"{}}}}}"#,
            plan, hash, duration
        )
    }

    fn write_log(lines: &[String]) -> (TempDir, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("mongod.log");
        let db_path = dir.path().join("slow.db");
        std::fs::write(&log_path, lines.join("\n")).unwrap();
        (dir, log_path, db_path)
    }

    fn stored(db_path: &Path) -> Vec<slowlog_analyzer::analyzer_core::AggregateRecord> {
        SqliteReportReader::open(db_path).unwrap().fetch_all().unwrap()
    }

    #[tokio::test]
    async fn test_two_fingerprints_end_to_end() {
        let (_dir, log_path, db_path) = write_log(&[
            slow_query("A", Some(100), "COLLSCAN"),
            slow_query("A", Some(300), "COLLSCAN"),
            slow_query("B", Some(50), "IXSCAN { status: 1 }"),
        ]);

        let summary = analyze(&log_path, &db_path).await.unwrap();
        assert_eq!(summary.fingerprints, 2);
        assert_eq!(summary.stats.events_aggregated, 3);
        assert!(!summary.replaced_previous);

        let records = stored(&db_path);
        let a = records.iter().find(|r| r.fingerprint == "A").unwrap();
        assert_eq!(a.total_duration_ms, 400);
        assert_eq!(a.occurrence_count, 2);
        assert_eq!(a.mean_duration_ms(), 200.0);
        let b = records.iter().find(|r| r.fingerprint == "B").unwrap();
        assert_eq!(b.total_duration_ms, 50);
        assert_eq!(b.occurrence_count, 1);
        assert_eq!(b.mean_duration_ms(), 50.0);

        let reader = SqliteReportReader::open(&db_path).unwrap();
        assert_eq!(reader.mean_duration_ms("A").unwrap(), Some(200.0));
        assert_eq!(reader.mean_duration_ms("B").unwrap(), Some(50.0));

        let rows = select_report(&db_path, &ReportOptions::default()).unwrap();
        let order: Vec<&str> = rows.iter().map(|r| r.fingerprint.as_str()).collect();
        assert_eq!(order, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_garbage_line_does_not_affect_counts() {
        let (_dir, log_path, db_path) = write_log(&[
            slow_query("A", Some(100), "COLLSCAN"),
            "this is {not json at all".to_string(),
            slow_query("A", Some(300), "COLLSCAN"),
        ]);

        let summary = analyze(&log_path, &db_path).await.unwrap();
        assert_eq!(summary.stats.decode_failures, 1);

        let records = stored(&db_path);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].occurrence_count, 2);
        assert_eq!(records[0].total_duration_ms, 400);
    }

    #[tokio::test]
    async fn test_missing_duration_counts_as_zero() {
        let (_dir, log_path, db_path) = write_log(&[
            slow_query("A", Some(90), "COLLSCAN"),
            slow_query("A", None, "COLLSCAN"),
        ]);

        analyze(&log_path, &db_path).await.unwrap();

        let records = stored(&db_path);
        assert_eq!(records[0].total_duration_ms, 90);
        assert_eq!(records[0].occurrence_count, 2);
        assert_eq!(records[0].mean_duration_ms(), 45.0);
    }

    #[tokio::test]
    async fn test_occurrences_match_extracted_events() {
        let (_dir, log_path, db_path) = write_log(&[
            slow_query("A", Some(10), "COLLSCAN"),
            r#"{"msg":"Slow query","attr":{"queryHash":"A","durationMillis":[1,2]}}"#.to_string(),
            r#"{"msg":"Slow query","attr":{"durationMillis":5}}"#.to_string(),
            r#"{"msg":"WiredTiger message","attr":{"message":"checkpoint"}}"#.to_string(),
            String::new(),
            slow_query("B", Some(20), "IXSCAN { a: 1 }"),
            slow_query("C", Some(30), "COLLSCAN"),
            slow_query("B", Some(40), "IXSCAN { a: 1 }"),
        ]);

        let summary = analyze(&log_path, &db_path).await.unwrap();
        let stats = summary.stats;
        assert_eq!(stats.lines_read, 8);
        assert_eq!(stats.extraction_failures, 1);
        assert_eq!(stats.not_applicable, 2);
        assert_eq!(stats.decode_failures, 1);
        assert_eq!(stats.events_aggregated, 4);

        let records = stored(&db_path);
        let total: u64 = records.iter().map(|r| r.occurrence_count).sum();
        assert_eq!(total, stats.events_aggregated);
        for record in &records {
            assert_eq!(record.plan_summaries.len() as u64, record.occurrence_count);
        }
    }

    #[tokio::test]
    async fn test_rerun_replaces_previous_store() {
        let (dir, log_path, db_path) = write_log(&[slow_query("OLD", Some(5), "COLLSCAN")]);
        analyze(&log_path, &db_path).await.unwrap();

        let second_log = dir.path().join("second.log");
        std::fs::write(&second_log, slow_query("NEW", Some(7), "COLLSCAN")).unwrap();
        let summary = analyze(&second_log, &db_path).await.unwrap();
        assert!(summary.replaced_previous);

        let records = stored(&db_path);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fingerprint, "NEW");
        assert_eq!(records[0].occurrence_count, 1);
    }

    #[tokio::test]
    async fn test_collscan_report() {
        let (_dir, log_path, db_path) = write_log(&[
            slow_query("A", Some(500), "IXSCAN { status: 1 }"),
            slow_query("B", Some(20), "COLLSCAN"),
            slow_query("B", Some(40), "IXSCAN { status: 1 }"),
            slow_query("C", Some(10), "COLLSCAN"),
        ]);
        analyze(&log_path, &db_path).await.unwrap();

        let options = ReportOptions {
            plan_contains: Some("COLLSCAN".to_string()),
            sort_key: SortKey::Count,
            ..Default::default()
        };
        let rows = select_report(&db_path, &options).unwrap();

        let order: Vec<&str> = rows.iter().map(|r| r.fingerprint.as_str()).collect();
        assert_eq!(order, vec!["B", "C"]);
        assert!(rows.iter().all(|r| r.plan_summaries.contains("COLLSCAN")));
        assert_eq!(rows[0].namespace, "shop.orders");
        assert_eq!(rows[0].command, r#"{"filter":{"status":"open"},"find":"orders"}"#);
    }

    #[tokio::test]
    async fn test_out_of_range_durations_do_not_abort_run() {
        let too_big = slow_query("B", None, "COLLSCAN").replace(
            r#""queryHash":"B""#,
            r#""queryHash":"B","durationMillis":{"$numberLong":"9223372036854775808"}"#,
        );
        let (_dir, log_path, db_path) = write_log(&[
            slow_query("A", Some(100), "COLLSCAN"),
            too_big,
            slow_query("C", Some(i64::MAX as u64), "COLLSCAN"),
            slow_query("C", Some(1), "COLLSCAN"),
        ]);

        let summary = analyze(&log_path, &db_path).await.unwrap();
        assert_eq!(summary.stats.extraction_failures, 1);
        assert_eq!(summary.stats.aggregation_failures, 1);
        assert_eq!(summary.stats.events_aggregated, 2);
        assert_eq!(summary.fingerprints, 2);

        let records = stored(&db_path);
        assert_eq!(records.len(), 2);
        let a = records.iter().find(|r| r.fingerprint == "A").unwrap();
        assert_eq!(a.total_duration_ms, 100);
        let c = records.iter().find(|r| r.fingerprint == "C").unwrap();
        assert_eq!(c.total_duration_ms, i64::MAX as u64);
        assert_eq!(c.occurrence_count, 1);
        assert!(records.iter().all(|r| r.fingerprint != "B"));
    }

    #[tokio::test]
    async fn test_missing_input_is_fatal_and_leaves_store_alone() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("slow.db");

        let err = analyze(&dir.path().join("absent.log"), &db_path).await.unwrap_err();

        assert!(matches!(err, AnalyzerError::InputNotFound(_)));
        assert!(err.to_string().contains("does not exist"));
        assert!(!db_path.exists());
    }
}
