//! Configuration types and parsing for reckon.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Main project configuration from reckon.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name
    pub name: String,

    /// Project version
    #[serde(default = "default_version")]
    pub version: String,

    /// Build script executed when required tables are missing.
    /// Relative paths resolve against the project root.
    #[serde(default = "default_script")]
    pub script: String,

    /// Tables that must exist before reconciliation data can be read.
    /// The build gate runs the script when any of these is absent.
    #[serde(default)]
    pub required_tables: Vec<String>,

    /// Table holding one reconciliation record per day
    #[serde(default = "default_mismatch_table")]
    pub mismatch_table: String,

    /// Absolute difference (in currency units) under which the two revenue
    /// measures count as matching
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Output directory for result files
    #[serde(default = "default_target_path")]
    pub target_path: String,

    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Raw CSV sources loaded by `rk load`: table name -> file path.
    /// Ordered map so loads happen in a stable order.
    #[serde(default)]
    pub sources: BTreeMap<String, String>,
}

/// Database type selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    /// DuckDB (default)
    #[default]
    DuckDb,
}

impl std::fmt::Display for DbType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbType::DuckDb => write!(f, "duckdb"),
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database type
    #[serde(rename = "type", default)]
    pub db_type: DbType,

    /// Database path (file-based or :memory:)
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DbType::default(),
            path: default_db_path(),
        }
    }
}

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_script() -> String {
    "sql/00_build_all.sql".to_string()
}

fn default_mismatch_table() -> String {
    "revenue_mismatch_daily".to_string()
}

fn default_tolerance() -> f64 {
    0.01
}

fn default_target_path() -> String {
    "target".to_string()
}

pub(crate) const DEFAULT_DB_PATH: &str = ":memory:";

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for reckon.yml or reckon.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("reckon.yml");
        let yaml_path = dir.join("reckon.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: dir.join("reckon.yml").display().to_string(),
            })
        }
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.name.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Project name cannot be empty".to_string(),
            });
        }

        if self.required_tables.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "required_tables must list at least one table".to_string(),
            });
        }

        // The build gate only guarantees tables it is told to require, so the
        // table every read goes through must be one of them.
        if !self.required_tables.contains(&self.mismatch_table) {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "mismatch_table '{}' must be listed in required_tables",
                    self.mismatch_table
                ),
            });
        }

        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "tolerance must be a non-negative number, got {}",
                    self.tolerance
                ),
            });
        }

        Ok(())
    }

    /// Get the absolute build script path relative to a project root
    pub fn script_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.script)
    }

    /// Get the absolute target path relative to a project root
    pub fn target_path_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.target_path)
    }

    /// Resolve a source CSV path against a project root
    pub fn source_path_absolute(&self, root: &Path, source: &str) -> PathBuf {
        root.join(source)
    }

    /// Resolve the database path against a project root.
    ///
    /// `:memory:` and absolute paths pass through unchanged so the same
    /// config works no matter which directory `rk` is invoked from.
    pub fn database_path_absolute(&self, root: &Path) -> String {
        let path = &self.database.path;
        if path == DEFAULT_DB_PATH || Path::new(path).is_absolute() {
            path.clone()
        } else {
            root.join(path).display().to_string()
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
