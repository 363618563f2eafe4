//! Integration tests for Reckon
//!
//! Drives the library crates end to end against the sample project fixture:
//! load the raw Olist-style CSVs, run the build gate, and reconcile the two
//! revenue definitions.

use rk_build::{ensure_built, BuildError, EnsureOutcome};
use rk_core::{count_status_drift, top_mismatch_days, DayStatus, Project, ReconSummary};
use rk_db::{Database, DuckDbBackend};
use std::path::Path;

fn sample_project() -> Project {
    Project::load(Path::new("tests/fixtures/sample_project")).unwrap()
}

async fn load_fixture_sources(db: &DuckDbBackend, project: &Project) {
    for (table, source) in &project.config.sources {
        let path = project.config.source_path_absolute(&project.root, source);
        db.load_csv(table, &path.display().to_string())
            .await
            .unwrap();
    }
}

/// Test loading the sample project
#[test]
fn test_load_sample_project() {
    let project = sample_project();

    assert_eq!(project.config.name, "sample_project");
    assert_eq!(project.config.tolerance, 0.01);
    assert_eq!(project.config.mismatch_table, "revenue_mismatch_daily");
    assert_eq!(project.config.required_tables.len(), 3);
    assert_eq!(project.config.sources.len(), 3);
    assert!(project.script_path().exists());
}

/// Test loading the raw CSV sources
#[tokio::test]
async fn test_load_sources() {
    let project = sample_project();
    let db = DuckDbBackend::in_memory().unwrap();

    load_fixture_sources(&db, &project).await;

    assert_eq!(db.query_count("SELECT * FROM orders").await.unwrap(), 6);
    assert_eq!(db.query_count("SELECT * FROM order_items").await.unwrap(), 6);
    assert_eq!(
        db.query_count("SELECT * FROM order_payments").await.unwrap(),
        5
    );
}

/// Test that the build gate builds all marts once and is a no-op after
#[tokio::test]
async fn test_build_gate_builds_marts() {
    let project = sample_project();
    let db = DuckDbBackend::in_memory().unwrap();
    load_fixture_sources(&db, &project).await;

    let outcome = ensure_built(
        &db,
        &project.config.required_tables,
        &project.script_path(),
    )
    .await
    .unwrap();

    match outcome {
        EnsureOutcome::Built(stats) => {
            // Entry script plus three includes, one statement each
            assert_eq!(stats.files, 4);
            assert_eq!(stats.statements, 3);
        }
        EnsureOutcome::AlreadyBuilt => panic!("expected a build on first call"),
    }

    let tables = db.list_tables().await.unwrap();
    for required in &project.config.required_tables {
        assert!(tables.contains(required), "missing {}", required);
    }

    // Second call sees every table and does not rebuild
    let outcome = ensure_built(
        &db,
        &project.config.required_tables,
        &project.script_path(),
    )
    .await
    .unwrap();
    assert!(matches!(outcome, EnsureOutcome::AlreadyBuilt));
}

/// Test the reconciliation results end to end
#[tokio::test]
async fn test_reconciliation_end_to_end() {
    let project = sample_project();
    let db = DuckDbBackend::in_memory().unwrap();
    load_fixture_sources(&db, &project).await;
    ensure_built(
        &db,
        &project.config.required_tables,
        &project.script_path(),
    )
    .await
    .unwrap();

    let records = db
        .fetch_mismatch_rows(&project.config.mismatch_table)
        .await
        .unwrap();
    assert_eq!(records.len(), 4);

    let day = |d: u32| chrono::NaiveDate::from_ymd_opt(2017, 1, d).unwrap();

    // 2017-01-01: both definitions agree
    assert_eq!(records[0].day, day(1));
    assert_eq!(records[0].status, DayStatus::Match);
    assert_eq!(records[0].revenue_finance, Some(100.0));
    assert_eq!(records[0].revenue_growth, Some(100.0));
    assert_eq!(records[0].diff, 0.0);

    // 2017-01-02: Finance drops the canceled order, Growth keeps it
    assert_eq!(records[1].day, day(2));
    assert_eq!(records[1].status, DayStatus::Mismatch);
    assert_eq!(records[1].revenue_finance, Some(80.0));
    assert_eq!(records[1].revenue_growth, Some(110.0));
    assert_eq!(records[1].diff, 30.0);

    // 2017-01-03: payment exceeds item price plus freight
    assert_eq!(records[2].day, day(3));
    assert_eq!(records[2].status, DayStatus::Mismatch);
    assert_eq!(records[2].diff, -10.0);

    // 2017-01-04: order without a payment row never reaches Finance
    assert_eq!(records[3].day, day(4));
    assert_eq!(records[3].status, DayStatus::MissingFinance);
    assert_eq!(records[3].revenue_finance, None);
    assert_eq!(records[3].revenue_growth, Some(75.0));
    assert_eq!(records[3].diff, 75.0);

    let summary = ReconSummary::from_records(&records);
    assert_eq!(summary.total_days, 4);
    assert_eq!(summary.match_days, 1);
    assert_eq!(summary.mismatch_days, 2);
    assert_eq!(summary.missing_finance_days, 1);
    assert_eq!(summary.missing_growth_days, 0);
    assert_eq!(summary.coverage_gap_days(), 1);
    assert_eq!(summary.first_day, Some(day(1)));
    assert_eq!(summary.last_day, Some(day(4)));

    // Worst mismatch first, coverage gaps excluded
    let top = top_mismatch_days(&records, 10);
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].day, day(2));
    assert_eq!(top[1].day, day(3));

    // Stored statuses agree with the configured tolerance; a much looser
    // tolerance would reclassify both mismatch days
    assert_eq!(count_status_drift(&records, project.config.tolerance), 0);
    assert_eq!(count_status_drift(&records, 50.0), 2);
}

/// Test that building without loaded sources surfaces a database error
#[tokio::test]
async fn test_build_without_sources_fails() {
    let project = sample_project();
    let db = DuckDbBackend::in_memory().unwrap();

    let err = ensure_built(
        &db,
        &project.config.required_tables,
        &project.script_path(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, BuildError::Execution(_)), "got {:?}", err);
}

/// Test that a missing build script fails fast when tables are absent
#[tokio::test]
async fn test_missing_script_fails_fast() {
    let project = sample_project();
    let db = DuckDbBackend::in_memory().unwrap();
    load_fixture_sources(&db, &project).await;

    let bogus = project.root.join("sql/99_nonexistent.sql");
    let err = ensure_built(&db, &project.config.required_tables, &bogus)
        .await
        .unwrap_err();

    assert!(matches!(err, BuildError::ScriptNotFound { .. }), "got {:?}", err);
}
