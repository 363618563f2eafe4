//! Report command implementation
//!
//! Reconciles the Finance and Growth daily revenue figures. The command
//! first runs the build gate (missing marts are built once, later runs are
//! no-ops), then reads the mismatch table and summarizes per-day statuses.
//! Mismatched values are the expected outcome of differing definitions;
//! days missing one side entirely point at a pipeline defect and are the
//! signals worth acting on.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rk_build::{ensure_built, EnsureOutcome};
use rk_core::{count_status_drift, top_mismatch_days, DayStatus, ReconRecord, ReconSummary};
use serde::Serialize;

use crate::cli::{GlobalArgs, ReportArgs, ReportOutput};
use crate::commands::common::{
    acquire_build_lock, create_database_connection, exit_code_for, format_money, load_project,
    print_table, resolve_database_path, write_json_results, ExitCode,
};

/// Full report payload for `--output json` and `--write-json`
#[derive(Debug, Serialize)]
struct ReportDocument {
    timestamp: DateTime<Utc>,
    mismatch_table: String,
    tolerance: f64,
    summary: ReconSummary,
    status_drift_days: usize,
    top_mismatches: Vec<ReconRecord>,
    /// Per-day records after the date-range (and `--mismatch-only`) filters
    days: Vec<ReconRecord>,
}

/// Execute the report command
pub(crate) async fn execute(args: &ReportArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let db = create_database_connection(&project, global)?;

    // Build gate before any read, the same lazy-build the dashboard ran on
    // startup. The lock only needs to cover the gate itself.
    {
        let db_path = resolve_database_path(&project, global);
        let _lock = acquire_build_lock(&db_path)?;
        let script = project.script_path();
        match ensure_built(db.as_ref(), &project.config.required_tables, &script).await {
            Ok(EnsureOutcome::AlreadyBuilt) => {}
            Ok(EnsureOutcome::Built(stats)) => {
                if global.verbose {
                    eprintln!(
                        "[verbose] Built missing tables ({} files, {} statements)",
                        stats.files, stats.statements
                    );
                }
            }
            Err(e) => {
                eprintln!("Build failed: {}", e);
                return Err(ExitCode(exit_code_for(&e)).into());
            }
        }
    }

    let all_records = match db.fetch_mismatch_rows(&project.config.mismatch_table).await {
        Ok(records) => records,
        Err(e) => {
            eprintln!("Failed to read {}: {}", project.config.mismatch_table, e);
            return Err(ExitCode(4).into());
        }
    };

    // Single-day drilldown short-circuits the summary view
    if let Some(day) = parse_day_arg(args.day.as_deref(), "--day")? {
        return drilldown(&all_records, day, args.output);
    }

    let from = parse_day_arg(args.from.as_deref(), "--from")?;
    let to = parse_day_arg(args.to.as_deref(), "--to")?;
    let records = filter_by_range(all_records, from, to);

    // Summary and drift are computed before --mismatch-only narrows the
    // day listing, so the headline counts always describe the full range.
    let summary = ReconSummary::from_records(&records);
    let drift = count_status_drift(&records, project.config.tolerance);
    let top: Vec<ReconRecord> = top_mismatch_days(&records, args.top)
        .into_iter()
        .cloned()
        .collect();
    let days: Vec<ReconRecord> = if args.mismatch_only {
        records
            .iter()
            .filter(|r| r.status == DayStatus::Mismatch)
            .cloned()
            .collect()
    } else {
        records
    };

    let document = ReportDocument {
        timestamp: Utc::now(),
        mismatch_table: project.config.mismatch_table.clone(),
        tolerance: project.config.tolerance,
        summary,
        status_drift_days: drift,
        top_mismatches: top,
        days,
    };

    match args.output {
        ReportOutput::Json => {
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        ReportOutput::Table => print_report(&document),
    }

    if args.write_json {
        let path = project.target_dir().join("report.json");
        write_json_results(&path, &document)?;
        if args.output == ReportOutput::Table {
            println!();
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}

/// Print the human-readable report
fn print_report(document: &ReportDocument) {
    let summary = &document.summary;

    if summary.total_days == 0 {
        println!(
            "No reconciliation rows in {} for the selected range.",
            document.mismatch_table
        );
        return;
    }

    println!(
        "Reconciliation for {} ({} days, tolerance {})",
        document.mismatch_table, summary.total_days, document.tolerance
    );
    println!();
    if let (Some(first), Some(last)) = (summary.first_day, summary.last_day) {
        println!("  span:            {} to {}", first, last);
    }
    println!("  match:           {}", summary.match_days);
    println!("  mismatch:        {}", summary.mismatch_days);
    println!("  missing_finance: {}", summary.missing_finance_days);
    println!("  missing_growth:  {}", summary.missing_growth_days);
    if summary.missing_both_days > 0 {
        println!("  missing_both:    {}", summary.missing_both_days);
    }

    if summary.coverage_gap_days() > 0 {
        println!();
        println!(
            "Warning: {} day(s) are missing one side entirely, likely a pipeline",
            summary.coverage_gap_days()
        );
        println!("coverage or join issue. Mismatched values alone are expected;");
        println!("missing days are not.");
    }

    if document.status_drift_days > 0 {
        println!();
        println!(
            "Warning: stored status disagrees with tolerance {} on {} day(s).",
            document.tolerance, document.status_drift_days
        );
        println!("Rebuild the marts with `rk build --force` if the tolerance changed.");
    }

    if !document.top_mismatches.is_empty() {
        println!();
        println!("Top {} mismatch days by |diff|:", document.top_mismatches.len());
        println!();
        let rows: Vec<Vec<String>> = document
            .top_mismatches
            .iter()
            .map(|r| {
                vec![
                    r.day.to_string(),
                    format_money(r.revenue_finance),
                    format_money(r.revenue_growth),
                    format!("{:.2}", r.diff),
                ]
            })
            .collect();
        print_table(&["DAY", "FINANCE", "GROWTH", "DIFF"], &rows);
    }
}

/// Print one day's record with its status explanation
fn drilldown(records: &[ReconRecord], day: NaiveDate, output: ReportOutput) -> Result<()> {
    let Some(record) = records.iter().find(|r| r.day == day) else {
        println!("No reconciliation row for {}.", day);
        return Ok(());
    };

    match output {
        ReportOutput::Json => {
            println!("{}", serde_json::to_string_pretty(record)?);
        }
        ReportOutput::Table => {
            println!("{}", record.day);
            println!("  finance: {}", format_money(record.revenue_finance));
            println!("  growth:  {}", format_money(record.revenue_growth));
            println!("  diff:    {:.2}", record.diff);
            println!("  status:  {}", record.status);
            println!();
            println!("{}", record.status.explanation());
        }
    }

    Ok(())
}

/// Parse an optional YYYY-MM-DD CLI argument
fn parse_day_arg(value: Option<&str>, flag: &str) -> Result<Option<NaiveDate>> {
    match value {
        None => Ok(None),
        Some(raw) => {
            let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .with_context(|| format!("Invalid {} date '{}', expected YYYY-MM-DD", flag, raw))?;
            Ok(Some(day))
        }
    }
}

/// Keep records inside the inclusive `[from, to]` day range
fn filter_by_range(
    mut records: Vec<ReconRecord>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Vec<ReconRecord> {
    records.retain(|r| {
        from.map_or(true, |d| r.day >= d) && to.map_or(true, |d| r.day <= d)
    });
    records
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
