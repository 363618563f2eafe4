//! rk-db - Database abstraction layer for Reckon
//!
//! This crate provides the `Database` trait and the DuckDB implementation
//! behind it.

pub mod duckdb;
pub mod error;
pub mod traits;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use traits::Database;
