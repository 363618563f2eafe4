//! Project loading

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use std::path::{Path, PathBuf};

/// Represents a Reckon project
#[derive(Debug)]
pub struct Project {
    /// Project root directory
    pub root: PathBuf,

    /// Project configuration
    pub config: Config,
}

impl Project {
    /// Load a project from a directory
    pub fn load(path: &Path) -> CoreResult<Self> {
        let root = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };

        if !root.exists() {
            return Err(CoreError::ProjectNotFound {
                path: root.display().to_string(),
            });
        }

        let config = Config::load_from_dir(&root)?;

        Ok(Self { root, config })
    }

    /// Absolute path of the build script
    pub fn script_path(&self) -> PathBuf {
        self.config.script_absolute(&self.root)
    }

    /// Absolute path of the target output directory
    pub fn target_dir(&self) -> PathBuf {
        self.config.target_path_absolute(&self.root)
    }

    /// Database path with relative paths resolved against the project root
    pub fn database_path(&self) -> String {
        self.config.database_path_absolute(&self.root)
    }
}

#[cfg(test)]
#[path = "project_test.rs"]
mod tests;
