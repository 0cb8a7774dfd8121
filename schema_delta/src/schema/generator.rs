//! Migration generator
//!
//! This module renders schema diff findings as MySQL statements

use crate::config::Config;
use crate::schema::diff::{MissingColumn, MissingTable, SchemaDiff};
use crate::schema::translate::{ColumnDefinitionTranslator, TranslationMode};
use crate::schema::types::{SchemaModel, TableDescriptor};
use crate::utils::naming::quote_identifier;

const COLUMN_INDENT: &str = "    ";

/// Statements produced from one diff, kept in two independent lists
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationStatements {
    pub alter: Vec<String>,
    pub create: Vec<String>,
}

impl MigrationStatements {
    /// Every statement in write order: alters, then creates
    pub fn all(&self) -> impl Iterator<Item = &String> {
        self.alter.iter().chain(self.create.iter())
    }

    /// Owned copy of [`MigrationStatements::all`]
    pub fn to_vec(&self) -> Vec<String> {
        self.all().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.alter.len() + self.create.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alter.is_empty() && self.create.is_empty()
    }
}

/// Migration SQL generator
#[derive(Debug, Clone, Copy, Default)]
pub struct MigrationGenerator {
    translator: ColumnDefinitionTranslator,
}

impl MigrationGenerator {
    /// Create a new migration generator
    pub fn new(mode: TranslationMode) -> Self {
        Self {
            translator: ColumnDefinitionTranslator::new(mode),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.translation.mode)
    }

    /// Generate migration SQL from a schema diff
    pub fn generate(&self, diff: &SchemaDiff) -> MigrationStatements {
        let alter = diff
            .missing_columns
            .iter()
            .map(|finding| {
                let sql = self.generate_add_column_sql(finding);
                tracing::info!(table = %finding.table, column = %finding.column, sql = %sql, "Missing column");
                sql
            })
            .collect();

        let create = diff
            .missing_tables
            .iter()
            .map(|finding| {
                let sql = self.generate_missing_table_sql(finding);
                tracing::info!(table = %finding.table, "Missing table");
                tracing::debug!(sql = %sql, "Generated CREATE TABLE");
                sql
            })
            .collect();

        MigrationStatements { alter, create }
    }

    /// Generate the statement for one missing column
    pub fn generate_add_column_sql(&self, finding: &MissingColumn) -> String {
        format!(
            "ALTER TABLE {} ADD COLUMN {} {};",
            quote_identifier(&finding.table),
            quote_identifier(&finding.column),
            self.translator.translate(&finding.definition)
        )
    }

    /// Generate the statement for one missing table
    pub fn generate_missing_table_sql(&self, finding: &MissingTable) -> String {
        self.generate_create_table_sql(&finding.table, &finding.descriptor)
    }

    /// Generate SQL to create a table
    pub fn generate_create_table_sql(&self, name: &str, table: &TableDescriptor) -> String {
        let column_defs: Vec<String> = table
            .columns
            .iter()
            .map(|(column, definition)| {
                format!(
                    "{} {}",
                    quote_identifier(column),
                    self.translator.translate(definition)
                )
            })
            .collect();

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{indent}{}\n);\n",
            quote_identifier(name),
            column_defs.join(&format!(",\n{COLUMN_INDENT}")),
            indent = COLUMN_INDENT
        )
    }

    /// Generate a full creation script for a schema
    ///
    /// Starts with `CREATE DATABASE` and `USE`, then one `CREATE TABLE` per
    /// table in schema order.
    pub fn generate_schema_dump(&self, schema: &SchemaModel, database: &str) -> Vec<String> {
        let database = quote_identifier(database);
        let mut statements = Vec::with_capacity(schema.len() + 2);

        statements.push(format!("CREATE DATABASE IF NOT EXISTS {};\n", database));
        statements.push(format!("USE {};\n", database));
        statements.extend(
            schema
                .tables
                .iter()
                .map(|(name, table)| self.generate_create_table_sql(name, table)),
        );

        statements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn missing_column(table: &str, column: &str, definition: &str) -> MissingColumn {
        MissingColumn {
            table: table.into(),
            column: column.into(),
            definition: definition.into(),
        }
    }

    #[test]
    fn empty_diff_produces_empty_lists() {
        let statements = MigrationGenerator::default().generate(&SchemaDiff::default());

        assert!(statements.alter.is_empty());
        assert!(statements.create.is_empty());
        assert!(statements.is_empty());
    }

    #[test]
    fn one_alter_per_missing_column() {
        let diff = SchemaDiff {
            missing_columns: vec![
                missing_column("users", "id_ext", "INT AI"),
                missing_column("users", "age", "INT NOT NULL"),
            ],
            ..Default::default()
        };

        let statements = MigrationGenerator::default().generate(&diff);

        assert_eq!(
            statements.alter,
            vec![
                "ALTER TABLE `users` ADD COLUMN `id_ext` INT AUTO_INCREMENT;",
                "ALTER TABLE `users` ADD COLUMN `age` INT NOT NULL;",
            ]
        );
        assert!(statements.create.is_empty());
    }

    #[test]
    fn create_table_layout() {
        let diff = SchemaDiff {
            missing_tables: vec![MissingTable {
                table: "orders".into(),
                descriptor: TableDescriptor::new()
                    .with_column("id", "INT AI PK")
                    .with_column("total", "DECIMAL(10,2)"),
            }],
            ..Default::default()
        };

        let statements = MigrationGenerator::default().generate(&diff);

        assert!(statements.alter.is_empty());
        assert_eq!(
            statements.create,
            vec!["CREATE TABLE IF NOT EXISTS `orders` (\n    `id` INT AUTO_INCREMENT PRIMARY KEY,\n    `total` DECIMAL(10,2)\n);\n"]
        );
    }

    #[test]
    fn token_mode_is_applied_to_every_column() {
        let generator = MigrationGenerator::new(TranslationMode::Token);
        let table = TableDescriptor::new()
            .with_column("id", "INT AI PK")
            .with_column("chain", "CHAIN");

        assert_eq!(
            generator.generate_create_table_sql("links", &table),
            "CREATE TABLE IF NOT EXISTS `links` (\n    `id` INT AUTO_INCREMENT PRIMARY KEY,\n    `chain` CHAIN\n);\n"
        );
        assert_eq!(
            generator.generate_add_column_sql(&missing_column("links", "kind", "CHAIN")),
            "ALTER TABLE `links` ADD COLUMN `kind` CHAIN;"
        );
    }

    #[test]
    fn all_yields_alters_before_creates() {
        let statements = MigrationStatements {
            alter: vec!["a1".into(), "a2".into()],
            create: vec!["c1".into()],
        };

        assert_eq!(statements.to_vec(), vec!["a1", "a2", "c1"]);
        assert_eq!(statements.len(), 3);
    }

    #[test]
    fn schema_dump_starts_with_database_statements() {
        let schema = SchemaModel::new()
            .with_table("users", TableDescriptor::new().with_column("id", "INT PK"))
            .with_table("tags", TableDescriptor::new().with_column("name", "TEXT"));

        let dump = MigrationGenerator::default().generate_schema_dump(&schema, "shop");

        assert_eq!(
            dump,
            vec![
                "CREATE DATABASE IF NOT EXISTS `shop`;\n".to_string(),
                "USE `shop`;\n".to_string(),
                "CREATE TABLE IF NOT EXISTS `users` (\n    `id` INT PRIMARY KEY\n);\n".to_string(),
                "CREATE TABLE IF NOT EXISTS `tags` (\n    `name` TEXT\n);\n".to_string(),
            ]
        );
    }
}
