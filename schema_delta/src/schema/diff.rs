//! Schema difference calculator
//!
//! This module compares a current schema snapshot against a baseline and
//! records what the baseline is missing. Only additive drift is detected:
//! columns and tables that disappeared from the current schema never become
//! findings. Removed tables are reported through `removed_tables` and a
//! warning, nothing else.

use crate::schema::types::{SchemaModel, TableDescriptor};

/// A column present in the current schema but absent from the baseline table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingColumn {
    pub table: String,
    pub column: String,
    pub definition: String,
}

/// A table present in the current schema but absent from the baseline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingTable {
    pub table: String,
    pub descriptor: TableDescriptor,
}

/// A single detected difference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finding<'a> {
    MissingColumn(&'a MissingColumn),
    MissingTable(&'a MissingTable),
}

/// Represents what the baseline needs to catch up with the current schema
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaDiff {
    /// In baseline table order, then current column order
    pub missing_columns: Vec<MissingColumn>,
    /// In current table order
    pub missing_tables: Vec<MissingTable>,
    /// Baseline tables with no counterpart in the current schema
    pub removed_tables: Vec<String>,
}

impl SchemaDiff {
    /// Compare `current` against `baseline`
    pub fn generate(current: &SchemaModel, baseline: &SchemaModel) -> Self {
        let mut diff = Self::default();

        for (table_name, baseline_table) in &baseline.tables {
            let Some(current_table) = current.table(table_name) else {
                tracing::warn!(table = %table_name, "Table does not exist in the latest schema");
                diff.removed_tables.push(table_name.clone());
                continue;
            };

            for (column_name, definition) in &current_table.columns {
                if !baseline_table.has_column(column_name) {
                    tracing::debug!(table = %table_name, column = %column_name, "Missing column");
                    diff.missing_columns.push(MissingColumn {
                        table: table_name.clone(),
                        column: column_name.clone(),
                        definition: definition.clone(),
                    });
                }
            }
        }

        diff.missing_tables = current
            .tables
            .iter()
            .filter(|(name, _)| !baseline.contains_table(name))
            .map(|(name, descriptor)| {
                tracing::debug!(table = %name, "Missing table");
                MissingTable {
                    table: name.clone(),
                    descriptor: descriptor.clone(),
                }
            })
            .collect();

        diff
    }

    /// All findings: missing columns first, then missing tables
    pub fn findings(&self) -> impl Iterator<Item = Finding<'_>> {
        self.missing_columns
            .iter()
            .map(Finding::MissingColumn)
            .chain(self.missing_tables.iter().map(Finding::MissingTable))
    }

    /// Number of findings that will turn into statements
    pub fn change_count(&self) -> usize {
        self.missing_columns.len() + self.missing_tables.len()
    }

    /// Check if the diff is empty (no statements needed)
    ///
    /// Removed tables do not count: they never produce a statement.
    pub fn is_empty(&self) -> bool {
        self.missing_columns.is_empty() && self.missing_tables.is_empty()
    }
}

/// Compare two schemas, see [`SchemaDiff::generate`]
pub fn compare(current: &SchemaModel, baseline: &SchemaModel) -> SchemaDiff {
    SchemaDiff::generate(current, baseline)
}
