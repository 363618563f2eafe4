//! Init command implementation - scaffolds a new Reckon project

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::cli::InitArgs;

/// Execute the init command
pub(crate) async fn execute(args: &InitArgs) -> Result<()> {
    // Reject names that could cause path traversal or confusing directory names
    if args.name.contains('/')
        || args.name.contains('\\')
        || args.name.contains("..")
        || args.name.starts_with('.')
        || args.name.starts_with('-')
    {
        anyhow::bail!(
            "Invalid project name '{}': must not contain '/', '\\', '..', or start with '.' or '-'",
            args.name
        );
    }

    let project_dir = Path::new(&args.name);

    if project_dir.exists() {
        anyhow::bail!(
            "Directory '{}' already exists. Choose a different project name.",
            args.name
        );
    }

    println!("Creating new Reckon project: {}\n", args.name);

    scaffold(project_dir, &args.name, &args.database_path)?;

    println!("  Created reckon.yml");
    println!("  Created sql/00_build_all.sql");
    println!("  Created sql/10_finance_revenue.sql");
    println!("  Created sql/20_growth_revenue.sql");
    println!("  Created sql/30_revenue_mismatch.sql");
    println!("  Created data/raw/");
    println!("  Created .gitignore");
    println!();
    println!("Project '{}' initialized successfully!", args.name);
    println!();
    println!("Next steps:");
    println!("  cd {}", args.name);
    println!("  # drop the Olist CSV exports into data/raw/");
    println!("  rk load       # Load raw CSVs into DuckDB");
    println!("  rk build      # Build the revenue marts");
    println!("  rk report     # Reconcile Finance vs Growth");

    Ok(())
}

/// Write the project skeleton into `project_dir`.
fn scaffold(project_dir: &Path, name: &str, database_path: &str) -> Result<()> {
    for dir in ["", "sql", "data/raw"] {
        let path = project_dir.join(dir);
        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    }

    // Escape YAML special characters in interpolated values
    let safe_name = name.replace('"', "\\\"");
    let safe_db_path = database_path.replace('"', "\\\"");
    let config_content = format!(
        r#"name: "{name}"
version: "1.0.0"

script: "sql/00_build_all.sql"
required_tables:
  - finance_revenue_daily
  - growth_revenue_daily
  - revenue_mismatch_daily
mismatch_table: "revenue_mismatch_daily"

# Figures closer than this count as a match. 30_revenue_mismatch.sql
# hard-codes the same threshold; keep the two in sync.
tolerance: 0.01

target_path: "target"

database:
  type: duckdb
  path: "{db_path}"

sources:
  orders: "data/raw/olist_orders_dataset.csv"
  order_items: "data/raw/olist_order_items_dataset.csv"
  order_payments: "data/raw/olist_order_payments_dataset.csv"
  customers: "data/raw/olist_customers_dataset.csv"
  products: "data/raw/olist_products_dataset.csv"
"#,
        name = safe_name,
        db_path = safe_db_path,
    );
    fs::write(project_dir.join("reckon.yml"), config_content)
        .context("Failed to write reckon.yml")?;

    let build_all_sql = "\
-- Build every revenue mart in dependency order.
.read 10_finance_revenue.sql
.read 20_growth_revenue.sql
.read 30_revenue_mismatch.sql
";
    fs::write(project_dir.join("sql/00_build_all.sql"), build_all_sql)
        .context("Failed to write sql/00_build_all.sql")?;

    let finance_sql = "\
-- Finance daily revenue: payments received, excluding orders Finance
-- does not recognize.
CREATE OR REPLACE TABLE finance_revenue_daily AS
SELECT
    CAST(o.order_purchase_timestamp AS DATE) AS day,
    SUM(p.payment_value) AS revenue_finance
FROM orders o
JOIN order_payments p USING (order_id)
WHERE o.order_status NOT IN ('canceled', 'unavailable')
GROUP BY 1
ORDER BY 1;
";
    fs::write(project_dir.join("sql/10_finance_revenue.sql"), finance_sql)
        .context("Failed to write sql/10_finance_revenue.sql")?;

    let growth_sql = "\
-- Growth daily revenue: item price plus freight across all orders.
CREATE OR REPLACE TABLE growth_revenue_daily AS
SELECT
    CAST(o.order_purchase_timestamp AS DATE) AS day,
    SUM(i.price + i.freight_value) AS revenue_growth
FROM orders o
JOIN order_items i USING (order_id)
GROUP BY 1
ORDER BY 1;
";
    fs::write(project_dir.join("sql/20_growth_revenue.sql"), growth_sql)
        .context("Failed to write sql/20_growth_revenue.sql")?;

    let mismatch_sql = "\
-- Daily reconciliation of the two revenue definitions.
-- The 0.01 match threshold mirrors `tolerance` in reckon.yml.
CREATE OR REPLACE TABLE revenue_mismatch_daily AS
SELECT
    COALESCE(f.day, g.day) AS day,
    f.revenue_finance,
    g.revenue_growth,
    COALESCE(g.revenue_growth, 0) - COALESCE(f.revenue_finance, 0) AS diff,
    CASE
        WHEN f.day IS NULL THEN 'missing_finance'
        WHEN g.day IS NULL THEN 'missing_growth'
        WHEN ABS(g.revenue_growth - f.revenue_finance) <= 0.01 THEN 'match'
        ELSE 'mismatch'
    END AS status
FROM finance_revenue_daily f
FULL OUTER JOIN growth_revenue_daily g ON f.day = g.day
ORDER BY 1;
";
    fs::write(project_dir.join("sql/30_revenue_mismatch.sql"), mismatch_sql)
        .context("Failed to write sql/30_revenue_mismatch.sql")?;

    let gitignore = "target/\n*.duckdb\n*.duckdb.wal\n*.lock\n";
    fs::write(project_dir.join(".gitignore"), gitignore).context("Failed to write .gitignore")?;

    Ok(())
}

#[cfg(test)]
#[path = "init_test.rs"]
mod tests;
