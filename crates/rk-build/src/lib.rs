//! rk-build - Build orchestration for Reckon
//!
//! This crate interprets the SQL build-script dialect (statements plus
//! `.read` includes) and provides the ensure-built gate that lazily
//! materializes the required tables.

pub mod error;
pub mod orchestrator;
pub mod runner;
pub(crate) mod script;

pub use error::{BuildError, BuildResult};
pub use orchestrator::{ensure_built, run_script, EnsureOutcome};
pub use runner::{RunStats, ScriptRunner};
