//! INSERT script generation from a table data cache
//!
//! Each table with rows gets its own `<table>.sql` file that selects the
//! database and inserts every non-empty row on a single line.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde_json::Value;

use crate::cache::{DataCache, Row};
use crate::error::Result;
use crate::output::writer::write_statements;
use crate::utils::naming::quote_identifier;

/// Renders cached rows as MySQL INSERT scripts
#[derive(Debug, Clone)]
pub struct InsertDumper {
    database: String,
}

impl InsertDumper {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
        }
    }

    /// Render the script for one table, or `None` when it has no rows
    pub fn render_table(&self, table: &str, rows: &[Row], generated_at: &DateTime<Local>) -> Option<String> {
        if rows.is_empty() {
            return None;
        }

        let table_ident = quote_identifier(table);
        let mut sql = String::new();

        sql.push_str("-- SQL INSERT statements generated from cache\n");
        sql.push_str(&format!(
            "-- Generated at: {}\n\n",
            generated_at.format("%Y-%m-%d %H:%M:%S")
        ));
        sql.push_str("SET SQL_MODE = 'NO_AUTO_VALUE_ON_ZERO';\n");
        sql.push_str("SET NAMES utf8mb4;\n\n");
        sql.push_str(&format!("USE {};\n\n", quote_identifier(&self.database)));
        sql.push_str(&format!("-- Data for table {}\n", table_ident));

        for (position, row) in rows.iter().enumerate() {
            if !row.values().any(is_truthy) {
                continue;
            }
            sql.push_str(&render_insert(&table_ident, row, position + 1));
            sql.push('\n');
        }

        Some(sql)
    }

    /// Write one script per table into `output_dir`, returning the files written
    pub fn write_all(&self, cache: &DataCache, output_dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let output_dir = output_dir.as_ref();
        let generated_at = Local::now();
        let mut written = Vec::new();

        for (table, table_data) in cache {
            let Some(script) = self.render_table(table, &table_data.data, &generated_at) else {
                tracing::debug!(table = %table, "No rows, skipping");
                continue;
            };

            let path = output_dir.join(format!("{}.sql", table));
            write_statements(&[script], &path)?;
            tracing::info!(table = %table, path = %path.display(), "INSERT statements generated");
            written.push(path);
        }

        Ok(written)
    }
}

/// Render one INSERT; an `id` column takes the row's 1-based position
fn render_insert(table_ident: &str, row: &Row, position: usize) -> String {
    let columns: Vec<String> = row.keys().map(|c| quote_identifier(c)).collect();
    let values: Vec<String> = row
        .iter()
        .map(|(column, value)| {
            if column == "id" {
                position.to_string()
            } else {
                sql_literal(value)
            }
        })
        .collect();

    format!(
        "INSERT INTO {} ({}) VALUES ({});",
        table_ident,
        columns.join(", "),
        values.join(", ")
    )
}

/// Render a cached value as a MySQL literal
pub fn sql_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => "0".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote_string(s),
        Value::Array(_) | Value::Object(_) => quote_string(&value.to_string()),
    }
}

fn quote_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::TableData;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn row(value: Value) -> Row {
        serde_json::from_value(value).unwrap()
    }

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn renders_literals() {
        assert_eq!(sql_literal(&json!(null)), "NULL");
        assert_eq!(sql_literal(&json!(true)), "1");
        assert_eq!(sql_literal(&json!(false)), "0");
        assert_eq!(sql_literal(&json!(42)), "42");
        assert_eq!(sql_literal(&json!(2.5)), "2.5");
        assert_eq!(sql_literal(&json!("O'Brien")), "'O''Brien'");
        assert_eq!(sql_literal(&json!(["a"])), "'[\"a\"]'");
    }

    #[test]
    fn renders_table_script() {
        let rows = vec![
            row(json!({"id": 99, "name": "ann", "active": true})),
            row(json!({"id": null, "name": "", "active": false})),
            row(json!({"id": 5, "name": "bob", "active": null})),
        ];

        let script = InsertDumper::new("shop")
            .render_table("users", &rows, &fixed_time())
            .unwrap();

        assert_eq!(
            script,
            "-- SQL INSERT statements generated from cache\n\
             -- Generated at: 2024-05-01 09:30:00\n\n\
             SET SQL_MODE = 'NO_AUTO_VALUE_ON_ZERO';\n\
             SET NAMES utf8mb4;\n\n\
             USE `shop`;\n\n\
             -- Data for table `users`\n\
             INSERT INTO `users` (`id`, `name`, `active`) VALUES (1, 'ann', 1);\n\
             INSERT INTO `users` (`id`, `name`, `active`) VALUES (3, 'bob', NULL);\n"
        );
    }

    #[test]
    fn id_position_follows_column() {
        let rows = vec![row(json!({"name": "x", "id": 10}))];
        let script = InsertDumper::new("db")
            .render_table("t", &rows, &fixed_time())
            .unwrap();

        assert!(script.contains("INSERT INTO `t` (`name`, `id`) VALUES ('x', 1);"));
    }

    #[test]
    fn tables_without_rows_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = DataCache::new();
        cache.insert("empty".into(), TableData::default());
        cache.insert(
            "tags".into(),
            TableData {
                data: vec![row(json!({"label": "rust"}))],
                last_updated: None,
            },
        );

        let written = InsertDumper::new("db").write_all(&cache, dir.path()).unwrap();

        assert_eq!(written, vec![dir.path().join("tags.sql")]);
        let content = std::fs::read_to_string(&written[0]).unwrap();
        assert!(content.ends_with("INSERT INTO `tags` (`label`) VALUES ('rust');\n\n"));
    }
}
