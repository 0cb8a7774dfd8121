//! Type definitions for schema snapshots
//!
//! Both containers are insertion-ordered: the order tables and columns were
//! loaded in is the order statements are rendered in.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A schema snapshot: table name to table descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaModel {
    pub tables: IndexMap<String, TableDescriptor>,
}

impl SchemaModel {
    /// Create a new empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table to the schema, replacing any table with the same name in place
    pub fn add_table(&mut self, name: impl Into<String>, table: TableDescriptor) {
        self.tables.insert(name.into(), table);
    }

    /// Builder form of [`SchemaModel::add_table`]
    pub fn with_table(mut self, name: impl Into<String>, table: TableDescriptor) -> Self {
        self.add_table(name, table);
        self
    }

    pub fn table(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables.get(name)
    }

    pub fn contains_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Remove the named tables, returning the ones that were present
    pub fn remove_tables(&mut self, names: &[String]) -> Vec<String> {
        let mut removed = Vec::new();
        for name in names {
            if self.tables.shift_remove(name).is_some() {
                tracing::info!(table = %name, "Removed table from schema snapshot");
                removed.push(name.clone());
            } else {
                tracing::debug!(table = %name, "Table not found in schema snapshot");
            }
        }
        removed
    }

    /// Remove the named columns from every table, returning how many were dropped
    pub fn remove_columns(&mut self, names: &[String]) -> usize {
        let mut removed = 0;
        for name in names {
            let mut found = false;
            for (table_name, table) in self.tables.iter_mut() {
                if table.columns.shift_remove(name).is_some() {
                    tracing::debug!(table = %table_name, column = %name, "Removed column from schema snapshot");
                    found = true;
                    removed += 1;
                }
            }
            if !found {
                tracing::debug!(column = %name, "Column not found in schema snapshot");
            }
        }
        removed
    }
}

impl FromIterator<(String, TableDescriptor)> for SchemaModel {
    fn from_iter<I: IntoIterator<Item = (String, TableDescriptor)>>(iter: I) -> Self {
        Self {
            tables: iter.into_iter().collect(),
        }
    }
}

/// A single table: column name to raw column definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub columns: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl TableDescriptor {
    /// Create a new table with no columns
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column to the table
    pub fn add_column(&mut self, name: impl Into<String>, definition: impl Into<String>) {
        self.columns.insert(name.into(), definition.into());
    }

    /// Builder form of [`TableDescriptor::add_column`]
    pub fn with_column(mut self, name: impl Into<String>, definition: impl Into<String>) -> Self {
        self.add_column(name, definition);
        self
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }
}
