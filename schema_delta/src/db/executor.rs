//! SQL executor
//!
//! Runs SQL script files against a database, one transaction per file.

use std::path::{Path, PathBuf};

use sqlx::Executor;

use crate::db::connection::DatabaseConnection;
use crate::error::Result;
use crate::output::postprocess::sql_files;

/// Outcome of running a directory of scripts
#[derive(Debug, Default)]
pub struct ExecutionReport {
    pub applied: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

impl ExecutionReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Split a script on `;` into non-blank commands
pub fn split_commands(script: &str) -> Vec<&str> {
    script
        .split(';')
        .map(str::trim)
        .filter(|command| !command.is_empty())
        .collect()
}

/// SQL executor for running script files
pub struct SqlExecutor {
    connection: DatabaseConnection,
}

impl SqlExecutor {
    /// Create a new SQL executor
    pub fn new(connection: DatabaseConnection) -> Self {
        Self { connection }
    }

    /// Execute every command of one file in a single transaction
    ///
    /// On failure the transaction is rolled back and the error returned.
    pub async fn execute_file(&self, path: &Path) -> Result<usize> {
        let script = tokio::fs::read_to_string(path).await?;
        let commands = split_commands(&script);

        let mut tx = self.connection.pool().begin().await?;
        for command in &commands {
            if let Err(e) = (&mut *tx).execute(*command).await {
                tx.rollback().await?;
                return Err(e.into());
            }
        }
        tx.commit().await?;

        Ok(commands.len())
    }

    /// Execute every `*.sql` file in `dir` in name order
    ///
    /// A failing file does not stop the remaining ones.
    pub async fn execute_directory(&self, dir: impl AsRef<Path>) -> Result<ExecutionReport> {
        let mut report = ExecutionReport::default();

        for path in sql_files(dir)? {
            match self.execute_file(&path).await {
                Ok(count) => {
                    tracing::info!(path = %path.display(), commands = count, "All commands executed");
                    report.applied.push(path);
                }
                Err(e) => {
                    tracing::error!(path = %path.display(), error = %e, "Rolled back file");
                    report.failed.push((path, e.to_string()));
                }
            }
        }

        Ok(report)
    }

    /// Get database connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }
}
