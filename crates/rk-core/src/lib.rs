//! rk-core - Core library for Reckon
//!
//! This crate provides configuration parsing, project loading, the advisory
//! build lock, and the daily revenue reconciliation model shared across all
//! Reckon components.

pub mod config;
pub mod error;
pub mod lock;
pub mod project;
pub mod recon;

pub use config::{Config, DatabaseConfig, DbType};
pub use error::{CoreError, CoreResult};
pub use lock::BuildLock;
pub use project::Project;
pub use recon::{
    classify, count_status_drift, top_mismatch_days, DayStatus, ReconRecord, ReconSummary,
};
