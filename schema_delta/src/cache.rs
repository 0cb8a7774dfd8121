//! Schema and data cache files
//!
//! Snapshots are stored as JSON (or YAML, picked by file extension) keyed by
//! table name. Loading is strict: anything unreadable or malformed is a
//! [`Error::SchemaLoad`].

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::schema::types::SchemaModel;

/// One cached row, columns in source order
pub type Row = IndexMap<String, Value>;

/// Cached table contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    pub data: Vec<Row>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

/// Table name to cached table contents
pub type DataCache = IndexMap<String, TableData>;

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    )
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::schema_load(path, e))
}

/// Load a schema snapshot
pub fn load_schema(path: impl AsRef<Path>) -> Result<SchemaModel> {
    let path = path.as_ref();
    let source = read_source(path)?;

    let schema: SchemaModel = if is_yaml(path) {
        serde_yaml::from_str(&source).map_err(|e| Error::schema_load(path, e))?
    } else {
        serde_json::from_str(&source).map_err(|e| Error::schema_load(path, e))?
    };

    tracing::debug!(path = %path.display(), tables = schema.len(), "Loaded schema");
    Ok(schema)
}

/// Load a schema snapshot, treating any failure as an empty schema
pub fn load_schema_or_empty(path: impl AsRef<Path>) -> SchemaModel {
    match load_schema(path) {
        Ok(schema) => schema,
        Err(e) => {
            tracing::warn!(error = %e, "Using empty schema");
            SchemaModel::new()
        }
    }
}

/// Save a schema snapshot as pretty-printed JSON
pub fn save_schema(schema: &SchemaModel, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(schema)?;
    fs::write(path, json)?;

    tracing::info!(path = %path.display(), tables = schema.len(), "Schema cache saved");
    Ok(())
}

/// Load a table data cache
pub fn load_data_cache(path: impl AsRef<Path>) -> Result<DataCache> {
    let path = path.as_ref();
    let source = read_source(path)?;
    let cache: DataCache = serde_json::from_str(&source).map_err(|e| Error::schema_load(path, e))?;

    tracing::debug!(path = %path.display(), tables = cache.len(), "Loaded data cache");
    Ok(cache)
}

/// Save a table data cache as pretty-printed JSON
pub fn save_data_cache(cache: &DataCache, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(cache)?;
    fs::write(path, json)?;

    tracing::info!(path = %path.display(), tables = cache.len(), "Data cache saved");
    Ok(())
}

/// Drop excluded tables, and excluded columns from every cached row
pub fn prune_data_cache(cache: &mut DataCache, tables: &[String], columns: &[String]) {
    for name in tables {
        if cache.shift_remove(name).is_some() {
            tracing::info!(table = %name, "Removed table from data cache");
        }
    }

    for table in cache.values_mut() {
        for row in table.data.iter_mut() {
            for name in columns {
                row.shift_remove(name);
            }
        }
    }
}
