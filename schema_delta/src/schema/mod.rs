//! Schema module for SchemaDelta
//!
//! This module handles schema snapshots, their comparison, and migration generation.

pub mod analyzer;
pub mod diff;
pub mod generator;
pub mod translate;
pub mod types;

// Re-export key types
pub use analyzer::SchemaAnalyzer;
pub use diff::{compare, Finding, MissingColumn, MissingTable, SchemaDiff};
pub use generator::{MigrationGenerator, MigrationStatements};
pub use translate::{ColumnDefinitionTranslator, TranslationMode};
pub use types::{SchemaModel, TableDescriptor};
