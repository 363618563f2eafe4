//! Database trait definition

use crate::error::DbResult;
use async_trait::async_trait;
use rk_core::ReconRecord;
use std::collections::BTreeSet;

/// Database abstraction trait for Reckon
///
/// Implementations must be Send + Sync for async operation.
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute a single SQL statement, discarding any result rows
    async fn execute(&self, sql: &str) -> DbResult<()>;

    /// Names of tables and views visible in the default schema
    async fn list_tables(&self) -> DbResult<BTreeSet<String>>;

    /// Execute query returning row count
    async fn query_count(&self, sql: &str) -> DbResult<usize>;

    /// Load a CSV file into a table, replacing the table if it exists
    async fn load_csv(&self, table: &str, path: &str) -> DbResult<()>;

    /// Read the reconciliation table, one record per day ordered by day
    async fn fetch_mismatch_rows(&self, table: &str) -> DbResult<Vec<ReconRecord>>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}
