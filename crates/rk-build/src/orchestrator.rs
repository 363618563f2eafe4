//! Ensure-built gate
//!
//! The gate makes table materialization lazy and idempotent: when every
//! required table already exists it does nothing, otherwise it runs the
//! build script once and verifies the tables afterwards.

use crate::error::{BuildError, BuildResult};
use crate::runner::{RunStats, ScriptRunner};
use rk_db::Database;
use std::path::Path;

/// Outcome of the ensure-built gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    /// Every required table already existed; nothing ran
    AlreadyBuilt,
    /// The build script ran to completion
    Built(RunStats),
}

/// Run the build script when any required table is missing; do nothing
/// otherwise.
///
/// The script path is only consulted when a build is actually needed, and a
/// missing script fails fast before any statement runs. After a build the
/// required set is re-checked: a script that does not produce what it is
/// supposed to is an error, not a silent partial success. The gate takes no
/// lock itself; callers wanting mutual exclusion against concurrent builds
/// hold a `BuildLock` across the call.
pub async fn ensure_built(
    db: &dyn Database,
    required: &[String],
    script: &Path,
) -> BuildResult<EnsureOutcome> {
    let missing = missing_tables(db, required).await?;
    if missing.is_empty() {
        log::debug!("all required tables present, skipping build");
        return Ok(EnsureOutcome::AlreadyBuilt);
    }

    if !script.exists() {
        return Err(BuildError::ScriptNotFound {
            path: script.display().to_string(),
        });
    }

    log::debug!("required tables missing: {}", missing.join(", "));
    let stats = ScriptRunner::new(db).run(script).await?;

    let still_missing = missing_tables(db, required).await?;
    if !still_missing.is_empty() {
        return Err(BuildError::BuildIncomplete {
            missing: still_missing.join(", "),
        });
    }

    Ok(EnsureOutcome::Built(stats))
}

/// Unconditionally run the build script, regardless of table state
pub async fn run_script(db: &dyn Database, script: &Path) -> BuildResult<RunStats> {
    ScriptRunner::new(db).run(script).await
}

/// Names from `required` that the database does not have yet
async fn missing_tables(db: &dyn Database, required: &[String]) -> BuildResult<Vec<String>> {
    let tables = db.list_tables().await?;
    Ok(required
        .iter()
        .filter(|t| !tables.contains(t.as_str()))
        .cloned()
        .collect())
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
