//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Reckon - build and reconcile daily revenue marts on DuckDB
#[derive(Parser, Debug)]
#[command(name = "rk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override the database path from reckon.yml
    #[arg(short, long, global = true, env = "RECKON_DB")]
    pub database: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scaffold a new Reckon project
    Init(InitArgs),

    /// Load raw CSV sources into the database
    Load(LoadArgs),

    /// Build the revenue marts from the SQL build script
    Build(BuildArgs),

    /// Show which required tables exist in the database
    Status(StatusArgs),

    /// Reconcile Finance vs Growth daily revenue
    Report(ReportArgs),
}

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Name of the project directory to create
    pub name: String,

    /// Database file path written into reckon.yml
    #[arg(long, default_value = "data/olist.duckdb")]
    pub database_path: String,
}

/// Arguments for the load command
#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Source table names to load (comma-separated, default: all)
    #[arg(short, long)]
    pub sources: Option<String>,
}

/// Arguments for the build command
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Run the build script even when all required tables exist
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: StatusOutput,
}

/// Status output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutput {
    /// Table format
    Table,
    /// JSON output
    Json,
}

/// Arguments for the report command
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// First day to include (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// Last day to include (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,

    /// Keep only mismatch days in the JSON day listing
    #[arg(long)]
    pub mismatch_only: bool,

    /// How many worst mismatch days to show
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Drill into a single day (YYYY-MM-DD)
    #[arg(long)]
    pub day: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: ReportOutput,

    /// Write the full report to <target>/report.json
    #[arg(long)]
    pub write_json: bool,
}

/// Report output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutput {
    /// Human-readable summary and tables
    Table,
    /// JSON document on stdout
    Json,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
