//! Status command implementation

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::{GlobalArgs, StatusArgs, StatusOutput};
use crate::commands::common::{
    create_database_connection, load_project, print_table, resolve_database_path,
};

/// Presence of one required table
#[derive(Debug, Serialize)]
struct TableStatus {
    table: String,
    present: bool,
    rows: Option<usize>,
}

/// Execute the status command
pub(crate) async fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let db = create_database_connection(&project, global)?;
    let db_path = resolve_database_path(&project, global);

    let existing = db.list_tables().await.context("Failed to list tables")?;

    let mut statuses = Vec::new();
    for table in &project.config.required_tables {
        if existing.contains(table) {
            let rows = db
                .query_count(&format!("SELECT * FROM {}", table))
                .await
                .ok();
            statuses.push(TableStatus {
                table: table.clone(),
                present: true,
                rows,
            });
        } else {
            statuses.push(TableStatus {
                table: table.clone(),
                present: false,
                rows: None,
            });
        }
    }

    match args.output {
        StatusOutput::Json => {
            println!("{}", serde_json::to_string_pretty(&statuses)?);
        }
        StatusOutput::Table => {
            println!("Database: {} ({})\n", db_path, db.db_type());

            let rows: Vec<Vec<String>> = statuses
                .iter()
                .map(|s| {
                    vec![
                        s.table.clone(),
                        if s.present { "yes" } else { "no" }.to_string(),
                        s.rows.map(|r| r.to_string()).unwrap_or_else(|| "-".into()),
                    ]
                })
                .collect();
            print_table(&["TABLE", "PRESENT", "ROWS"], &rows);

            let missing = statuses.iter().filter(|s| !s.present).count();
            println!();
            if missing == 0 {
                println!("All {} required tables present.", statuses.len());
            } else {
                println!(
                    "{} of {} required tables missing. Run `rk build` to create them.",
                    missing,
                    statuses.len()
                );
            }
        }
    }

    Ok(())
}
