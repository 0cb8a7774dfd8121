//! Database module for SchemaDelta
//!
//! This module handles MySQL connections and script execution.

pub mod connection;
pub mod executor;

// Re-export key types
pub use connection::DatabaseConnection;
pub use executor::{ExecutionReport, SqlExecutor};
