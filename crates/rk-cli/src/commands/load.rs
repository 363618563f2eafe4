//! Load command implementation

use anyhow::Result;
use std::collections::HashSet;

use crate::cli::{GlobalArgs, LoadArgs};
use crate::commands::common::{create_database_connection, load_project, ExitCode};

/// Execute the load command
pub(crate) async fn execute(args: &LoadArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let db = create_database_connection(&project, global)?;

    if project.config.sources.is_empty() {
        println!("No sources configured in reckon.yml.");
        return Ok(());
    }

    // Filter sources if --sources was specified. The config map is ordered,
    // so loads happen in a stable order either way.
    let to_load: Vec<(&String, &String)> = if let Some(filter) = &args.sources {
        let filter_names: HashSet<&str> = filter.split(',').map(|s| s.trim()).collect();
        project
            .config
            .sources
            .iter()
            .filter(|(table, _)| filter_names.contains(table.as_str()))
            .collect()
    } else {
        project.config.sources.iter().collect()
    };

    if to_load.is_empty() {
        println!("No matching sources found.");
        return Ok(());
    }

    if global.verbose {
        eprintln!("[verbose] Loading {} sources", to_load.len());
    }

    println!("Loading {} sources...\n", to_load.len());

    let mut success_count = 0;
    let mut failure_count = 0;
    let mut total_rows: usize = 0;

    for (table, source) in &to_load {
        let path = project.config.source_path_absolute(&project.root, source);
        let path_str = path.display().to_string();

        match db.load_csv(table, &path_str).await {
            Ok(_) => {
                let row_count = db
                    .query_count(&format!("SELECT * FROM {}", table))
                    .await
                    .unwrap_or(0);

                success_count += 1;
                total_rows += row_count;
                println!("  ✓ {} ({} rows)", table, row_count);
            }
            Err(e) => {
                failure_count += 1;
                println!("  ✗ {} - {}", table, e);
            }
        }
    }

    println!();
    println!("Loaded {} sources ({} total rows)", success_count, total_rows);

    if failure_count > 0 {
        // Exit code 4 = database error
        return Err(ExitCode(4).into());
    }

    Ok(())
}
