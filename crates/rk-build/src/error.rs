//! Error types for rk-build

use rk_db::DbError;
use thiserror::Error;

/// Build pipeline errors
#[derive(Error, Debug)]
pub enum BuildError {
    /// B001: Build script not found
    #[error("[B001] Build script not found: {path}")]
    ScriptNotFound { path: String },

    /// B002: Include directive points at a missing file
    #[error("[B002] Include not found: {path} (included from {from})")]
    IncludeNotFound { path: String, from: String },

    /// B003: Include cycle detected
    #[error("[B003] Circular include detected: {chain}")]
    CyclicInclude { chain: String },

    /// B004: IO error with file path context
    #[error("[B004] Failed to read '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// B005: A statement was rejected by the database
    #[error("[B005] {0}")]
    Execution(#[from] DbError),

    /// B006: Script ran but required tables are still missing
    #[error("[B006] Build completed but required tables are still missing: {missing}")]
    BuildIncomplete { missing: String },
}

/// Result type alias for BuildError
pub type BuildResult<T> = Result<T, BuildError>;
