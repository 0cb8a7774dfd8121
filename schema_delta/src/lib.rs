//! SchemaDelta: schema-diff driven SQL migration generation
//!
//! SchemaDelta compares a cached "latest" schema snapshot against an older
//! baseline snapshot and emits the `ALTER TABLE ... ADD COLUMN` and
//! `CREATE TABLE` statements that bring the baseline up to date.
//!
//! The comparison and statement generation ([`SchemaDiff`],
//! [`MigrationGenerator`]) are pure and infallible. Everything around them
//! (snapshot files, the database, output files) lives in the other modules and
//! is driven by [`SchemaDelta`].

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod output;
pub mod schema;
pub mod utils;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

// Re-export main types for easier access
pub use config::Config;
pub use db::connection::DatabaseConnection;
pub use error::{Error, Result};
pub use schema::analyzer::SchemaAnalyzer;
pub use schema::diff::SchemaDiff;
pub use schema::generator::{MigrationGenerator, MigrationStatements};
pub use schema::translate::{ColumnDefinitionTranslator, TranslationMode};
pub use schema::types::{SchemaModel, TableDescriptor};

use cache::DataCache;
use config::TranslationConfig;
use db::executor::{ExecutionReport, SqlExecutor};
use output::InsertDumper;

/// A diff together with the statements rendered from it
#[derive(Debug, Clone, Default)]
pub struct MigrationPlan {
    pub diff: SchemaDiff,
    pub statements: MigrationStatements,
}

/// Compare two snapshots and render the migration statements
///
/// Fails only when `strict_identifiers` is set and a name cannot be quoted.
pub fn plan_migration(
    current: &SchemaModel,
    baseline: &SchemaModel,
    translation: &TranslationConfig,
) -> Result<MigrationPlan> {
    if translation.strict_identifiers {
        utils::validate_schema_identifiers(current)?;
    }

    let diff = SchemaDiff::generate(current, baseline);
    let statements = MigrationGenerator::new(translation.mode).generate(&diff);

    Ok(MigrationPlan { diff, statements })
}

/// Initialize SchemaDelta with the specified configuration file
pub fn init(config_path: impl AsRef<Path>) -> Result<SchemaDelta> {
    Ok(SchemaDelta::new(config::load_from_file(config_path)?))
}

/// The main entry point tying snapshots, generation and output together
pub struct SchemaDelta {
    config: Config,
}

impl SchemaDelta {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load the latest and baseline snapshots
    ///
    /// With `allow_missing`, an unreadable snapshot is treated as empty.
    pub fn load_schemas(&self, allow_missing: bool) -> Result<(SchemaModel, SchemaModel)> {
        let paths = &self.config.paths;
        if allow_missing {
            Ok((
                cache::load_schema_or_empty(&paths.latest_schema),
                cache::load_schema_or_empty(&paths.baseline_schema),
            ))
        } else {
            Ok((
                cache::load_schema(&paths.latest_schema)?,
                cache::load_schema(&paths.baseline_schema)?,
            ))
        }
    }

    pub fn plan(&self, current: &SchemaModel, baseline: &SchemaModel) -> Result<MigrationPlan> {
        plan_migration(current, baseline, &self.config.translation)
    }

    /// Write a plan to a timestamped file in the migration directory
    pub fn write_migration(&self, plan: &MigrationPlan, now: &DateTime<Local>) -> Result<PathBuf> {
        let path = output::timestamped_migration_path(&self.config.paths.migration_dir, now);
        output::write_statements(&plan.statements.to_vec(), &path)?;
        Ok(path)
    }

    /// Load both snapshots, diff them, and write the migration file
    ///
    /// Returns the plan and, when there was anything to write, the file path.
    pub fn diff(&self, allow_missing: bool) -> Result<(MigrationPlan, Option<PathBuf>)> {
        let (current, baseline) = self.load_schemas(allow_missing)?;
        let plan = self.plan(&current, &baseline)?;

        if plan.statements.is_empty() {
            tracing::info!("Baseline schema is already up to date");
            return Ok((plan, None));
        }

        let path = self.write_migration(&plan, &Local::now())?;
        tracing::info!(
            path = %path.display(),
            alter = plan.statements.alter.len(),
            create = plan.statements.create.len(),
            "ALTER and CREATE TABLE statements written"
        );
        Ok((plan, Some(path)))
    }

    /// Write a full creation script for the latest snapshot
    pub fn dump_schema(&self) -> Result<PathBuf> {
        let database = &self.config.database()?.name;
        let schema = cache::load_schema(&self.config.paths.latest_schema)?;
        if self.config.translation.strict_identifiers {
            utils::validate_schema_identifiers(&schema)?;
        }

        let statements =
            MigrationGenerator::from_config(&self.config).generate_schema_dump(&schema, database);
        let path = self.config.paths.sql_dir.join("create_table.sql");
        output::write_statements(&statements, &path)?;
        Ok(path)
    }

    /// Write per-table INSERT scripts from the data cache
    pub fn dump_data(&self) -> Result<Vec<PathBuf>> {
        let database = &self.config.database()?.name;
        let data = cache::load_data_cache(&self.config.paths.data_cache)?;
        InsertDumper::new(database.as_str()).write_all(&data, &self.config.paths.sql_dir)
    }

    /// Strip configured tokens from SQL files in `dir` (default: the SQL directory)
    pub fn strip(&self, dir: Option<&Path>) -> Result<Vec<PathBuf>> {
        let dir = dir.unwrap_or(self.config.paths.sql_dir.as_path());
        output::strip_tokens_in_directory(dir, &self.config.postprocess.strip_tokens)
    }

    /// Snapshot the live database and save it as the latest schema
    ///
    /// With `include_data`, every table's rows are also saved to the data cache.
    pub async fn snapshot(&self, include_data: bool) -> Result<(SchemaModel, Option<DataCache>)> {
        let connection = DatabaseConnection::connect(self.config.database()?).await?;
        let analyzer = SchemaAnalyzer::new(connection.clone(), self.config.snapshot.clone());

        let schema = analyzer.analyze().await?;
        let data = if include_data {
            Some(analyzer.snapshot_data(&schema).await?)
        } else {
            None
        };
        connection.close().await;

        cache::save_schema(&schema, &self.config.paths.latest_schema)?;
        if let Some(data) = &data {
            cache::save_data_cache(data, &self.config.paths.data_cache)?;
        }
        Ok((schema, data))
    }

    /// Create the database if needed and execute every SQL file in `dir`
    pub async fn apply(&self, dir: impl AsRef<Path>) -> Result<ExecutionReport> {
        let db_config = self.config.database()?;

        let server = DatabaseConnection::connect_server(db_config).await?;
        server.create_database(&db_config.name).await?;
        server.close().await;

        let executor = SqlExecutor::new(DatabaseConnection::connect(db_config).await?);
        let report = executor.execute_directory(dir).await?;
        executor.connection().pool().close().await;

        Ok(report)
    }

    pub async fn drop_database(&self) -> Result<()> {
        let db_config = self.config.database()?;
        let server = DatabaseConnection::connect_server(db_config).await?;
        server.drop_database(&db_config.name).await?;
        server.close().await;
        Ok(())
    }
}
