//! schema_delta CLI
//!
//! Command-line tool for snapshotting MySQL schemas and generating catch-up migrations.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use schema_delta::{config, utils, SchemaDelta};

/// Compare schema snapshots and generate ALTER/CREATE TABLE migrations.
#[derive(Parser)]
#[command(name = "schema_delta")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults are used when it does not exist).
    #[arg(short, long, default_value = "schema_delta.toml")]
    config: PathBuf,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare the latest schema against the baseline and write a migration file.
    Diff {
        /// Treat a missing or unreadable snapshot as an empty schema.
        #[arg(long)]
        allow_missing: bool,
    },

    /// Snapshot the live database into the latest schema file.
    Snapshot {
        /// Also cache every table's rows for `dump-data`.
        #[arg(long)]
        data: bool,
    },

    /// Write a full CREATE script for the latest schema.
    DumpSchema,

    /// Write per-table INSERT scripts from the data cache.
    DumpData,

    /// Remove configured tokens (e.g. ENCRYPTION='Y') from SQL files.
    Strip {
        /// Directory to process (defaults to the configured SQL directory).
        dir: Option<PathBuf>,
    },

    /// Create the database if needed and execute every SQL file in a directory.
    Apply {
        /// Directory containing the SQL files.
        dir: PathBuf,
    },

    /// Drop the configured database.
    DropDatabase {
        /// Required, the drop cannot be undone.
        #[arg(long)]
        confirm: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = config::load_or_default(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    utils::init_logging(config.logging.as_ref(), cli.verbose)?;

    let delta = SchemaDelta::new(config);

    match cli.command {
        Commands::Diff { allow_missing } => {
            let (plan, path) = delta.diff(allow_missing)?;
            for table in &plan.diff.removed_tables {
                println!("Table '{}' does not exist in the latest schema.", table);
            }
            match path {
                Some(path) => println!(
                    "{} ALTER and {} CREATE TABLE statements written to '{}'.",
                    plan.statements.alter.len(),
                    plan.statements.create.len(),
                    path.display()
                ),
                None => println!("Baseline schema is already up to date."),
            }
        }
        Commands::Snapshot { data } => {
            let (schema, data) = delta.snapshot(data).await?;
            println!(
                "Cached {} tables to '{}'.",
                schema.len(),
                delta.config().paths.latest_schema.display()
            );
            if let Some(data) = data {
                println!(
                    "Cached data of {} tables to '{}'.",
                    data.len(),
                    delta.config().paths.data_cache.display()
                );
            }
        }
        Commands::DumpSchema => {
            let path = delta.dump_schema()?;
            println!("CREATE TABLE statements written to '{}'.", path.display());
        }
        Commands::DumpData => {
            let paths = delta.dump_data()?;
            println!("INSERT statements written for {} tables.", paths.len());
        }
        Commands::Strip { dir } => {
            let updated = delta.strip(dir.as_deref())?;
            for path in &updated {
                println!("Updated file: {}", path.display());
            }
        }
        Commands::Apply { dir } => {
            let report = delta.apply(&dir).await?;
            for (path, error) in &report.failed {
                eprintln!("Error executing commands from {}: {}", path.display(), error);
            }
            if !report.is_success() {
                bail!(
                    "{} of {} files failed",
                    report.failed.len(),
                    report.failed.len() + report.applied.len()
                );
            }
            println!("Executed {} files.", report.applied.len());
        }
        Commands::DropDatabase { confirm } => {
            if !confirm {
                bail!("refusing to drop the database without --confirm");
            }
            delta.drop_database().await?;
            println!("Database dropped.");
        }
    }

    Ok(())
}
