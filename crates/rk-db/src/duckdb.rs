//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::Database;
use async_trait::async_trait;
use chrono::NaiveDate;
use duckdb::Connection;
use rk_core::ReconRecord;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Mutex;

/// DuckDB database backend
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path).map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    /// Execute SQL synchronously. `execute_batch` swallows result rows, so a
    /// build script statement may be DDL, DML, or a bare SELECT.
    fn execute_sync(&self, sql: &str) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(sql)
            .map_err(|e| DbError::ExecutionError(format!("{}: {}", e, sql)))
    }

    /// Query count synchronously
    fn query_count_sync(&self, sql: &str) -> DbResult<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM ({})", sql), [], |row| {
                row.get(0)
            })
            .map_err(DbError::from)?;
        Ok(count as usize)
    }

    /// List tables and views in the default schema synchronously
    fn list_tables_sync(&self) -> DbResult<BTreeSet<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT table_name FROM information_schema.tables WHERE table_schema = 'main'")
            .map_err(DbError::from)?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(DbError::from)?;

        let mut tables = BTreeSet::new();
        for row in rows {
            tables.insert(row.map_err(DbError::from)?);
        }
        Ok(tables)
    }

    /// Read the reconciliation table synchronously.
    ///
    /// DATE columns come back through `CAST(day AS VARCHAR)` and are parsed
    /// with chrono; the duckdb crate has no direct NaiveDate accessor.
    fn fetch_mismatch_rows_sync(&self, table: &str) -> DbResult<Vec<ReconRecord>> {
        let conn = self.conn.lock().unwrap();
        let sql = format!(
            "SELECT CAST(day AS VARCHAR) AS day, revenue_finance, revenue_growth, diff, status \
             FROM {} ORDER BY day",
            table
        );
        let mut stmt = conn.prepare(&sql).map_err(DbError::from)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<f64>>(1)?,
                    row.get::<_, Option<f64>>(2)?,
                    row.get::<_, Option<f64>>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })
            .map_err(DbError::from)?;

        let mut records = Vec::new();
        for row in rows {
            let (day_str, finance, growth, diff, status) = row.map_err(DbError::from)?;
            let day = NaiveDate::parse_from_str(&day_str, "%Y-%m-%d")
                .map_err(|e| DbError::RowDecode(format!("bad day '{}': {}", day_str, e)))?;
            let record = ReconRecord::from_columns(day, finance, growth, diff, &status)
                .map_err(|e| DbError::RowDecode(e.to_string()))?;
            records.push(record);
        }
        Ok(records)
    }
}

#[async_trait]
impl Database for DuckDbBackend {
    async fn execute(&self, sql: &str) -> DbResult<()> {
        self.execute_sync(sql)
    }

    async fn list_tables(&self) -> DbResult<BTreeSet<String>> {
        self.list_tables_sync()
    }

    async fn query_count(&self, sql: &str) -> DbResult<usize> {
        self.query_count_sync(sql)
    }

    async fn load_csv(&self, table: &str, path: &str) -> DbResult<()> {
        let sql = format!(
            "CREATE OR REPLACE TABLE {} AS SELECT * FROM read_csv_auto('{}', ignore_errors=false)",
            table, path
        );
        self.execute_sync(&sql)
    }

    async fn fetch_mismatch_rows(&self, table: &str) -> DbResult<Vec<ReconRecord>> {
        self.fetch_mismatch_rows_sync(table)
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rk_core::DayStatus;

    #[tokio::test]
    async fn test_in_memory() {
        let db = DuckDbBackend::in_memory().unwrap();
        assert_eq!(db.db_type(), "duckdb");
    }

    #[tokio::test]
    async fn test_execute_and_list_tables() {
        let db = DuckDbBackend::in_memory().unwrap();
        db.execute("CREATE TABLE beta (id INT)").await.unwrap();
        db.execute("CREATE TABLE alpha (id INT)").await.unwrap();

        let tables = db.list_tables().await.unwrap();
        let names: Vec<&String> = tables.iter().collect();
        assert_eq!(names, vec!["alpha", "beta"]);
    }

    #[tokio::test]
    async fn test_execute_tolerates_bare_select() {
        let db = DuckDbBackend::in_memory().unwrap();
        // build scripts may contain plain SELECTs; results are discarded
        db.execute("SELECT 42").await.unwrap();
    }

    #[tokio::test]
    async fn test_execute_rejects_invalid_sql() {
        let db = DuckDbBackend::in_memory().unwrap();
        let err = db.execute("CREATE TABEL broken (id INT)").await.unwrap_err();
        assert!(matches!(err, DbError::ExecutionError(_)));
    }

    #[tokio::test]
    async fn test_list_tables_includes_views() {
        let db = DuckDbBackend::in_memory().unwrap();
        db.execute("CREATE TABLE t (id INT)").await.unwrap();
        db.execute("CREATE VIEW v AS SELECT * FROM t").await.unwrap();

        let tables = db.list_tables().await.unwrap();
        assert!(tables.contains("t"));
        assert!(tables.contains("v"));
    }

    #[tokio::test]
    async fn test_query_count() {
        let db = DuckDbBackend::in_memory().unwrap();
        db.execute("CREATE TABLE nums AS SELECT * FROM range(10) t(n)")
            .await
            .unwrap();

        let count = db.query_count("SELECT * FROM nums").await.unwrap();
        assert_eq!(count, 10);
    }

    #[tokio::test]
    async fn test_load_csv() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("orders.csv");
        std::fs::write(&csv_path, "order_id,amount\no1,10.5\no2,20.0\n").unwrap();

        let db = DuckDbBackend::in_memory().unwrap();
        db.load_csv("orders", csv_path.to_str().unwrap())
            .await
            .unwrap();

        let count = db.query_count("SELECT * FROM orders").await.unwrap();
        assert_eq!(count, 2);

        // loading again replaces rather than appends
        db.load_csv("orders", csv_path.to_str().unwrap())
            .await
            .unwrap();
        let count = db.query_count("SELECT * FROM orders").await.unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_fetch_mismatch_rows() {
        let db = DuckDbBackend::in_memory().unwrap();
        db.execute(
            "CREATE TABLE revenue_mismatch_daily (
                day DATE,
                revenue_finance DOUBLE,
                revenue_growth DOUBLE,
                diff DOUBLE,
                status VARCHAR
            )",
        )
        .await
        .unwrap();
        // inserted out of day order on purpose
        db.execute(
            "INSERT INTO revenue_mismatch_daily VALUES
                (DATE '2017-01-02', 80.0, 110.0, 30.0, 'mismatch'),
                (DATE '2017-01-01', 100.0, 100.0, 0.0, 'match'),
                (DATE '2017-01-03', NULL, 75.0, 75.0, 'missing_finance'),
                (DATE '2017-01-04', 50.0, NULL, -50.0, 'missing_growth')",
        )
        .await
        .unwrap();

        let records = db
            .fetch_mismatch_rows("revenue_mismatch_daily")
            .await
            .unwrap();
        assert_eq!(records.len(), 4);

        let days: Vec<String> = records.iter().map(|r| r.day.to_string()).collect();
        assert_eq!(
            days,
            vec!["2017-01-01", "2017-01-02", "2017-01-03", "2017-01-04"]
        );

        assert_eq!(records[0].status, DayStatus::Match);
        assert_eq!(records[1].diff, 30.0);
        assert_eq!(records[2].revenue_finance, None);
        assert_eq!(records[2].status, DayStatus::MissingFinance);
        assert_eq!(records[3].revenue_growth, None);
    }

    #[tokio::test]
    async fn test_fetch_missing_table_is_classified() {
        let db = DuckDbBackend::in_memory().unwrap();
        let err = db.fetch_mismatch_rows("no_such_table").await.unwrap_err();
        assert!(matches!(err, DbError::TableNotFound(_)));
    }

    #[tokio::test]
    async fn test_fetch_rejects_unknown_status() {
        let db = DuckDbBackend::in_memory().unwrap();
        db.execute(
            "CREATE TABLE bad_status AS SELECT
                DATE '2017-01-01' AS day,
                1.0 AS revenue_finance,
                1.0 AS revenue_growth,
                0.0 AS diff,
                'partial' AS status",
        )
        .await
        .unwrap();

        let err = db.fetch_mismatch_rows("bad_status").await.unwrap_err();
        assert!(matches!(err, DbError::RowDecode(_)));
    }

    #[tokio::test]
    async fn test_from_path_persists() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.duckdb");

        {
            let db = DuckDbBackend::new(db_path.to_str().unwrap()).unwrap();
            db.execute("CREATE TABLE persisted (id INT)").await.unwrap();
        }

        let db = DuckDbBackend::new(db_path.to_str().unwrap()).unwrap();
        assert!(db.list_tables().await.unwrap().contains("persisted"));
    }
}
