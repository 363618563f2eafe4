//! Build command implementation

use anyhow::Result;
use chrono::Utc;
use rk_build::{ensure_built, run_script, EnsureOutcome};
use serde::Serialize;
use std::time::Instant;

use crate::cli::{BuildArgs, GlobalArgs};
use crate::commands::common::{
    acquire_build_lock, create_database_connection, exit_code_for, load_project,
    resolve_database_path, write_json_results, CommandResults, ExitCode, RunStatus,
};

/// Per-table verification result written to build_results.json
#[derive(Debug, Clone, Serialize)]
struct TableBuildResult {
    table: String,
    status: RunStatus,
    rows: Option<usize>,
    error: Option<String>,
}

/// Execute the build command
pub(crate) async fn execute(args: &BuildArgs, global: &GlobalArgs) -> Result<()> {
    let start_time = Instant::now();
    let project = load_project(global)?;
    let db = create_database_connection(&project, global)?;
    let script = project.script_path();

    // Held across the gate and the verification pass so concurrent builds
    // against the same database file serialize instead of racing.
    let db_path = resolve_database_path(&project, global);
    let _lock = acquire_build_lock(&db_path)?;

    if global.verbose {
        eprintln!(
            "[verbose] Build gate for {:?} using {}",
            project.config.required_tables,
            script.display()
        );
    }

    let outcome = if args.force {
        run_script(db.as_ref(), &script)
            .await
            .map(EnsureOutcome::Built)
    } else {
        ensure_built(db.as_ref(), &project.config.required_tables, &script).await
    };

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Build failed: {}", e);
            return Err(ExitCode(exit_code_for(&e)).into());
        }
    };

    match outcome {
        EnsureOutcome::AlreadyBuilt => {
            println!("All required tables already exist, nothing to build.");
        }
        EnsureOutcome::Built(stats) => {
            println!(
                "Ran {} ({} files, {} statements) [{}ms]",
                project.config.script,
                stats.files,
                stats.statements,
                start_time.elapsed().as_millis()
            );
        }
    }

    // Report row counts for every required table
    println!();
    let mut results = Vec::new();
    let mut success_count = 0;
    let mut failure_count = 0;

    for table in &project.config.required_tables {
        match db.query_count(&format!("SELECT * FROM {}", table)).await {
            Ok(rows) => {
                success_count += 1;
                println!("  ✓ {} ({} rows)", table, rows);
                results.push(TableBuildResult {
                    table: table.clone(),
                    status: RunStatus::Success,
                    rows: Some(rows),
                    error: None,
                });
            }
            Err(e) => {
                failure_count += 1;
                println!("  ✗ {} - {}", table, e);
                results.push(TableBuildResult {
                    table: table.clone(),
                    status: RunStatus::Error,
                    rows: None,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    let envelope = CommandResults {
        timestamp: Utc::now(),
        elapsed_secs: start_time.elapsed().as_secs_f64(),
        success_count,
        failure_count,
        results,
    };
    let results_path = project.target_dir().join("build_results.json");
    write_json_results(&results_path, &envelope)?;

    if global.verbose {
        eprintln!("[verbose] Wrote {}", results_path.display());
    }

    if failure_count > 0 {
        return Err(ExitCode(4).into());
    }

    Ok(())
}
