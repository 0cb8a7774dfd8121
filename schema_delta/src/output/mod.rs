//! Output module for SchemaDelta
//!
//! This module writes generated SQL to disk and post-processes SQL files.

pub mod inserts;
pub mod postprocess;
pub mod writer;

// Re-export key functions
pub use inserts::InsertDumper;
pub use postprocess::{sql_files, strip_tokens, strip_tokens_in_directory};
pub use writer::{timestamped_migration_path, write_statements};
