//! Advisory build lock
//!
//! Running the build gate concurrently against one database file would race
//! the existence check against the script run, so callers hold a `BuildLock`
//! across the whole gate. The lock is a `.lock` sibling of the database file
//! created with `create_new`; the holder's pid is written into it for
//! debugging. Dropping the lock removes the file. In-memory databases are
//! private to their process and need no lock.

use crate::error::{CoreError, CoreResult};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Held advisory lock for one database path
#[derive(Debug)]
pub struct BuildLock {
    path: PathBuf,
}

impl BuildLock {
    /// Acquire the lock for a database file.
    ///
    /// Fails with `LockHeld` when another process (or a crashed one that left
    /// the file behind) already holds it.
    pub fn acquire(db_path: &Path) -> CoreResult<Self> {
        let path = lock_path(db_path);

        // The database file may not exist yet on a first build
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CoreError::IoWithPath {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let mut file = match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(CoreError::LockHeld {
                    path: path.display().to_string(),
                });
            }
            Err(e) => {
                return Err(CoreError::IoWithPath {
                    path: path.display().to_string(),
                    source: e,
                });
            }
        };

        if let Err(e) = writeln!(file, "{}", std::process::id()) {
            let _ = std::fs::remove_file(&path);
            return Err(CoreError::IoWithPath {
                path: path.display().to_string(),
                source: e,
            });
        }

        Ok(Self { path })
    }

    /// Path of the lock file on disk
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for BuildLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            log::warn!(
                "Failed to remove build lock {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

fn lock_path(db_path: &Path) -> PathBuf {
    PathBuf::from(format!("{}.lock", db_path.display()))
}

#[cfg(test)]
#[path = "lock_test.rs"]
mod tests;
