use super::*;
use rk_db::DuckDbBackend;
use std::path::PathBuf;

fn required(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn write_build_scripts(dir: &std::path::Path) -> PathBuf {
    std::fs::write(
        dir.join("part1.sql"),
        "CREATE TABLE p AS SELECT 1 AS x;\n",
    )
    .unwrap();
    let script = dir.join("00_build_all.sql");
    std::fs::write(
        &script,
        "-- build everything\n.read part1.sql\nCREATE TABLE t AS SELECT * FROM p;\n",
    )
    .unwrap();
    script
}

#[tokio::test]
async fn test_builds_when_tables_missing() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_build_scripts(dir.path());
    let db = DuckDbBackend::in_memory().unwrap();

    let outcome = ensure_built(&db, &required(&["p", "t"]), &script)
        .await
        .unwrap();

    // t selects from p, so the include had to run first
    assert_eq!(
        outcome,
        EnsureOutcome::Built(RunStats { files: 2, statements: 2 })
    );
    let tables = db.list_tables().await.unwrap();
    assert!(tables.contains("p"));
    assert!(tables.contains("t"));
}

#[tokio::test]
async fn test_second_call_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_build_scripts(dir.path());
    let db = DuckDbBackend::in_memory().unwrap();

    let req = required(&["p", "t"]);
    let first = ensure_built(&db, &req, &script).await.unwrap();
    assert!(matches!(first, EnsureOutcome::Built(_)));

    // deleting the script proves the second call never touches it
    std::fs::remove_file(&script).unwrap();
    let second = ensure_built(&db, &req, &script).await.unwrap();
    assert_eq!(second, EnsureOutcome::AlreadyBuilt);
}

#[tokio::test]
async fn test_no_build_needed_ignores_script_path() {
    let dir = tempfile::tempdir().unwrap();
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute("CREATE TABLE p AS SELECT 1").await.unwrap();

    let bogus = dir.path().join("never_written.sql");
    let outcome = ensure_built(&db, &required(&["p"]), &bogus).await.unwrap();
    assert_eq!(outcome, EnsureOutcome::AlreadyBuilt);
}

#[tokio::test]
async fn test_missing_script_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let db = DuckDbBackend::in_memory().unwrap();

    let missing = dir.path().join("00_build_all.sql");
    let err = ensure_built(&db, &required(&["p"]), &missing)
        .await
        .unwrap_err();
    assert!(matches!(err, BuildError::ScriptNotFound { .. }));
}

#[tokio::test]
async fn test_incomplete_build_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("partial.sql");
    std::fs::write(&script, "CREATE TABLE p AS SELECT 1;\n").unwrap();
    let db = DuckDbBackend::in_memory().unwrap();

    let err = ensure_built(&db, &required(&["p", "q"]), &script)
        .await
        .unwrap_err();

    match err {
        BuildError::BuildIncomplete { missing } => assert_eq!(missing, "q"),
        other => panic!("expected BuildIncomplete, got {other:?}"),
    }
    // the partial result is left in place, nothing is rolled back
    assert!(db.list_tables().await.unwrap().contains("p"));
}

#[tokio::test]
async fn test_failing_statement_surfaces() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("broken.sql");
    std::fs::write(&script, "SELECT * FROM table_that_is_not_there;\n").unwrap();
    let db = DuckDbBackend::in_memory().unwrap();

    let err = ensure_built(&db, &required(&["p"]), &script)
        .await
        .unwrap_err();
    assert!(matches!(err, BuildError::Execution(_)));
}

#[tokio::test]
async fn test_run_script_rebuilds_unconditionally() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("rebuild.sql");
    std::fs::write(
        &script,
        "CREATE OR REPLACE TABLE p AS SELECT 2 AS x;\n",
    )
    .unwrap();
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute("CREATE TABLE p AS SELECT 1 AS x").await.unwrap();

    let stats = run_script(&db, &script).await.unwrap();
    assert_eq!(stats.statements, 1);

    let replaced = db
        .query_count("SELECT * FROM p WHERE x = 2")
        .await
        .unwrap();
    assert_eq!(replaced, 1);
}
