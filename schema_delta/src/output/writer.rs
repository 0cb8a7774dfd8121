//! Statement file writer

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};

use crate::error::Result;

const MIGRATION_SUFFIX: &str = "alter_create_statements.sql";

/// Write statements verbatim, each followed by a newline
pub fn write_statements<S: AsRef<str>>(statements: &[S], destination: impl AsRef<Path>) -> Result<()> {
    let destination = destination.as_ref();
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = BufWriter::new(File::create(destination)?);
    for statement in statements {
        file.write_all(statement.as_ref().as_bytes())?;
        file.write_all(b"\n")?;
    }
    file.flush()?;

    tracing::info!(
        path = %destination.display(),
        statements = statements.len(),
        "SQL statements written"
    );
    Ok(())
}

/// Migration file path for a run started at `now`
pub fn timestamped_migration_path<Tz: TimeZone>(dir: impl AsRef<Path>, now: &DateTime<Tz>) -> PathBuf
where
    Tz::Offset: std::fmt::Display,
{
    dir.as_ref()
        .join(format!("{}_{}", now.format("%Y%m%d_%H%M%S"), MIGRATION_SUFFIX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn writes_one_statement_per_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("out.sql");
        let statements = vec![
            "ALTER TABLE `users` ADD COLUMN `age` INT;".to_string(),
            "CREATE TABLE IF NOT EXISTS `t` (\n    `id` INT\n);\n".to_string(),
        ];

        write_statements(&statements, &path).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "ALTER TABLE `users` ADD COLUMN `age` INT;\nCREATE TABLE IF NOT EXISTS `t` (\n    `id` INT\n);\n\n"
        );
    }

    #[test]
    fn empty_statement_list_writes_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.sql");

        write_statements::<String>(&[], &path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn migration_path_is_timestamped() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        let path = timestamped_migration_path("sql/migration", &now);

        assert_eq!(
            path,
            PathBuf::from("sql/migration/20240309_070501_alter_create_statements.sql")
        );
    }
}
