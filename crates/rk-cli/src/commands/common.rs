//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rk_build::BuildError;
use rk_core::{BuildLock, Project};
use rk_db::{Database, DuckDbBackend};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::cli::GlobalArgs;

/// The DuckDB in-memory pseudo-path. In-memory databases are private to the
/// process, so they get no parent directory and no build lock.
pub(crate) const MEMORY_DB: &str = ":memory:";

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly. The build
/// lock in particular must be released on the way out.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Intentionally empty: ExitCode is a control-flow mechanism, not a
        // user-facing error. If anyhow's Display chain ever reaches this
        // (e.g. downcast_ref fails in main.rs), we don't want "exit code N"
        // leaking into stderr.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Status for per-table results written to JSON.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum RunStatus {
    Success,
    Error,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Success => write!(f, "success"),
            RunStatus::Error => write!(f, "error"),
        }
    }
}

/// Map a build failure to the process exit status.
///
/// Script and include problems are project configuration mistakes (exit 1);
/// statement failures and an incomplete build after a successful run are
/// database-side failures (exit 4).
pub(crate) fn exit_code_for(err: &BuildError) -> i32 {
    match err {
        BuildError::ScriptNotFound { .. }
        | BuildError::IncludeNotFound { .. }
        | BuildError::CyclicInclude { .. }
        | BuildError::Io { .. } => 1,
        BuildError::Execution(_) | BuildError::BuildIncomplete { .. } => 4,
    }
}

/// Load a project from the directory specified in global CLI arguments.
pub(crate) fn load_project(global: &GlobalArgs) -> Result<Project> {
    Project::load(Path::new(&global.project_dir)).context("Failed to load project")
}

/// Database path for this invocation: the --database / RECKON_DB override
/// when present, otherwise the project config path resolved against the
/// project root.
pub(crate) fn resolve_database_path(project: &Project, global: &GlobalArgs) -> String {
    global
        .database
        .clone()
        .unwrap_or_else(|| project.database_path())
}

/// Create a database connection for the resolved database path.
///
/// File-backed databases get their parent directory created first so a
/// fresh checkout can build into `data/` without manual setup.
pub(crate) fn create_database_connection(
    project: &Project,
    global: &GlobalArgs,
) -> Result<Arc<dyn Database>> {
    let db_path = resolve_database_path(project, global);
    if db_path != MEMORY_DB {
        if let Some(parent) = Path::new(&db_path).parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory {}", parent.display())
            })?;
        }
    }
    if global.verbose {
        eprintln!("[verbose] Connecting to database: {}", db_path);
    }
    let db: Arc<dyn Database> =
        Arc::new(DuckDbBackend::new(&db_path).context("Failed to connect to database")?);
    Ok(db)
}

/// Acquire the advisory build lock for a file-backed database.
///
/// Returns `None` for in-memory databases, which no other process can see.
/// The lock is held until the returned guard is dropped.
pub(crate) fn acquire_build_lock(db_path: &str) -> Result<Option<BuildLock>> {
    if db_path == MEMORY_DB {
        return Ok(None);
    }
    let lock = BuildLock::acquire(Path::new(db_path)).context("Failed to acquire build lock")?;
    Ok(Some(lock))
}

/// Generic wrapper for command results written to JSON.
///
/// Commands that write a results file share the same envelope: a timestamp,
/// elapsed seconds, success/failure counts, and a vec of per-item results.
/// `CommandResults<T>` captures that pattern so each command only needs to
/// define its per-item result type.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CommandResults<T: Serialize> {
    pub timestamp: DateTime<Utc>,
    pub elapsed_secs: f64,
    pub success_count: usize,
    pub failure_count: usize,
    pub results: Vec<T>,
}

/// Serialize `data` as pretty-printed JSON and write it to `path`.
///
/// Creates any missing parent directories before writing.  Returns an
/// `anyhow::Result` with context describing which step failed.
pub(crate) fn write_json_results<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create target directory")?;
    }
    let json = serde_json::to_string_pretty(data).context("Failed to serialize results")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Table-printing utilities
// ---------------------------------------------------------------------------

/// Calculate column widths for a table given headers and row data.
///
/// For each column, returns the maximum width across the header and all
/// row values so that data aligns when printed with left-padding.
pub(crate) fn calculate_column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.len());
        }
    }
    widths
}

/// Print a formatted table to stdout.
///
/// Calculates column widths from `headers` and `rows`, then prints
/// a left-aligned header row, a separator line of dashes, and each
/// data row.  Columns are separated by two spaces.
///
/// # Examples
///
/// ```ignore
/// print_table(
///     &["DAY", "STATUS"],
///     &[vec!["2017-01-02".into(), "mismatch".into()]],
/// );
/// // DAY         STATUS
/// // ----------  --------
/// // 2017-01-02  mismatch
/// ```
pub(crate) fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let widths = calculate_column_widths(headers, rows);

    let header_parts: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, &w)| format!("{:<width$}", h, width = w))
        .collect();
    println!("{}", header_parts.join("  "));

    let sep_parts: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep_parts.join("  "));

    for row in rows {
        let row_parts: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<width$}", cell, width = w))
            .collect();
        println!("{}", row_parts.join("  "));
    }
}

/// Render an optional money amount with two decimals, "-" when absent.
pub(crate) fn format_money(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "-".to_string(),
    }
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
