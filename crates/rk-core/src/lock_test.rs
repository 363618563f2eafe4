use super::*;

#[test]
fn test_acquire_creates_sibling_lock_file() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("olist.duckdb");

    let lock = BuildLock::acquire(&db_path).unwrap();
    let expected = dir.path().join("olist.duckdb.lock");
    assert_eq!(lock.path(), expected.as_path());
    assert!(expected.exists());

    let contents = std::fs::read_to_string(&expected).unwrap();
    assert_eq!(contents.trim(), std::process::id().to_string());
}

#[test]
fn test_second_acquire_fails_while_held() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("olist.duckdb");

    let _lock = BuildLock::acquire(&db_path).unwrap();
    let err = BuildLock::acquire(&db_path).unwrap_err();
    assert!(matches!(err, CoreError::LockHeld { .. }));
    assert!(err.to_string().contains("olist.duckdb.lock"));
}

#[test]
fn test_drop_releases_the_lock() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("olist.duckdb");
    let lock_file = dir.path().join("olist.duckdb.lock");

    {
        let _lock = BuildLock::acquire(&db_path).unwrap();
        assert!(lock_file.exists());
    }
    assert!(!lock_file.exists());

    // and the lock can be taken again
    let _again = BuildLock::acquire(&db_path).unwrap();
}

#[test]
fn test_acquire_creates_missing_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("data").join("db").join("olist.duckdb");

    let lock = BuildLock::acquire(&db_path).unwrap();
    assert!(lock.path().exists());
}
