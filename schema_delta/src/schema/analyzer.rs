//! Database schema analyzer
//!
//! This module snapshots a live MySQL schema into a [`SchemaModel`].

use async_trait::async_trait;
use chrono::Local;
use indexmap::IndexMap;
use sqlx::types::Json;
use sqlx::{FromRow, MySql, Pool, Row as _};

use crate::cache::{self, DataCache, Row, TableData};
use crate::config::SnapshotConfig;
use crate::db::connection::DatabaseConnection;
use crate::error::Result;
use crate::schema::types::{SchemaModel, TableDescriptor};
use crate::utils::naming::quote_identifier;

/// Schema analyzer trait
#[async_trait]
pub trait Analyzer {
    /// Names of the base tables (views excluded) in the current database
    async fn table_names(&self) -> Result<Vec<String>>;

    /// Column definitions of one table, in ordinal order
    async fn analyze_table(&self, table_name: &str) -> Result<TableDescriptor>;
}

/// Schema analyzer for database schema introspection
pub struct SchemaAnalyzer {
    connection: DatabaseConnection,
    snapshot: SnapshotConfig,
}

impl SchemaAnalyzer {
    /// Create a new schema analyzer
    pub fn new(connection: DatabaseConnection, snapshot: SnapshotConfig) -> Self {
        Self {
            connection,
            snapshot,
        }
    }

    /// Snapshot the current database schema
    ///
    /// Type normalizations are applied first, then excluded tables and
    /// columns are pruned.
    pub async fn analyze(&self) -> Result<SchemaModel> {
        let analyzer = MySqlAnalyzer {
            pool: self.connection.pool(),
        };

        let mut schema = SchemaModel::new();
        for table_name in analyzer.table_names().await? {
            let mut table = analyzer.analyze_table(&table_name).await?;
            normalize_definitions(&mut table, &self.snapshot);
            tracing::debug!(table = %table_name, columns = table.columns.len(), "Analyzed table");
            schema.add_table(table_name, table);
        }

        schema.remove_tables(&self.snapshot.exclude_tables);
        schema.remove_columns(&self.snapshot.exclude_columns);

        tracing::info!(tables = schema.len(), "Schema analyzed");
        Ok(schema)
    }

    /// Read every row of the tables in `schema`, columns in snapshot order
    ///
    /// Excluded tables and columns are pruned from the result as well.
    pub async fn snapshot_data(&self, schema: &SchemaModel) -> Result<DataCache> {
        let pool = self.connection.pool();
        let mut data = DataCache::new();

        for (table_name, table) in &schema.tables {
            if table.columns.is_empty() {
                continue;
            }

            let rows = sqlx::query(&select_rows_sql(table_name, table))
                .fetch_all(pool)
                .await?;

            let mut cached = Vec::with_capacity(rows.len());
            for row in rows {
                let Json(raw) = row.try_get::<Json<Row>, _>(0)?;
                cached.push(order_row(raw, table));
            }

            tracing::debug!(table = %table_name, rows = cached.len(), "Cached table data");
            data.insert(
                table_name.clone(),
                TableData {
                    data: cached,
                    last_updated: Some(Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()),
                },
            );
        }

        cache::prune_data_cache(
            &mut data,
            &self.snapshot.exclude_tables,
            &self.snapshot.exclude_columns,
        );

        tracing::info!(tables = data.len(), "Table data cached");
        Ok(data)
    }
}

/// Row type for `INFORMATION_SCHEMA.COLUMNS`
#[derive(Debug, Clone, FromRow)]
struct ColumnRow {
    column_name: String,
    data_type: String,
    column_default: Option<String>,
    is_nullable: String,
    column_key: String,
    extra: String,
    character_maximum_length: Option<i64>,
}

/// MySQL schema analyzer
struct MySqlAnalyzer<'a> {
    pool: &'a Pool<MySql>,
}

#[async_trait]
impl<'a> Analyzer for MySqlAnalyzer<'a> {
    async fn table_names(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SHOW FULL TABLES WHERE Table_type = 'BASE TABLE'")
            .fetch_all(self.pool)
            .await?;

        let mut names = Vec::with_capacity(rows.len());
        for row in rows {
            names.push(row.try_get::<String, _>(0)?);
        }
        Ok(names)
    }

    async fn analyze_table(&self, table_name: &str) -> Result<TableDescriptor> {
        let sql = r#"
            SELECT CAST(COLUMN_NAME AS CHAR) AS column_name,
                   CAST(DATA_TYPE AS CHAR) AS data_type,
                   CAST(COLUMN_DEFAULT AS CHAR) AS column_default,
                   CAST(IS_NULLABLE AS CHAR) AS is_nullable,
                   CAST(COLUMN_KEY AS CHAR) AS column_key,
                   CAST(EXTRA AS CHAR) AS extra,
                   CAST(CHARACTER_MAXIMUM_LENGTH AS SIGNED) AS character_maximum_length
            FROM INFORMATION_SCHEMA.COLUMNS
            WHERE TABLE_NAME = ?
              AND TABLE_SCHEMA = DATABASE()
            ORDER BY ORDINAL_POSITION
        "#;

        let column_rows = sqlx::query_as::<_, ColumnRow>(sql)
            .bind(table_name)
            .fetch_all(self.pool)
            .await?;

        let mut table = TableDescriptor::new();
        for row in &column_rows {
            table.add_column(row.column_name.clone(), build_column_definition(row));
        }
        table.last_updated = Some(Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string());

        Ok(table)
    }
}

/// Build the cached definition string for one column
fn build_column_definition(row: &ColumnRow) -> String {
    let mut definition = row.data_type.clone();

    if let Some(length) = row.character_maximum_length {
        definition.push_str(&format!("({})", length));
    }
    if row.is_nullable == "NO" {
        definition.push_str(" NOT NULL");
    }
    if let Some(default) = &row.column_default {
        definition.push_str(&format!(" DEFAULT '{}'", default));
    }
    if row.column_key == "PRI" {
        definition.push_str(" PRIMARY KEY");
    }
    if row.extra.contains("auto_increment") {
        definition.push_str(" AUTO_INCREMENT");
    }

    definition
}

/// One `JSON_OBJECT(...)` per row over the table's snapshot columns
fn select_rows_sql(table_name: &str, table: &TableDescriptor) -> String {
    let pairs = table
        .columns
        .keys()
        .map(|column| format!("'{}', {}", column.replace('\'', "''"), quote_identifier(column)))
        .collect::<Vec<_>>()
        .join(", ");

    format!("SELECT JSON_OBJECT({}) FROM {}", pairs, quote_identifier(table_name))
}

/// Reorder a row to the table's column order
///
/// MySQL sorts JSON object keys, so the order the server returns is not the
/// column order.
fn order_row(mut raw: Row, table: &TableDescriptor) -> Row {
    let mut ordered = IndexMap::with_capacity(raw.len());
    for column in table.columns.keys() {
        if let Some(value) = raw.shift_remove(column) {
            ordered.insert(column.clone(), value);
        }
    }
    ordered.extend(raw);
    ordered
}

/// Rewrite definitions that exactly match a configured normalization
fn normalize_definitions(table: &mut TableDescriptor, snapshot: &SnapshotConfig) {
    for definition in table.columns.values_mut() {
        if let Some(replacement) = snapshot.type_normalizations.get(definition.as_str()) {
            *definition = replacement.clone();
        }
    }
}
