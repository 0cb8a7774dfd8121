//! SQL file post-processing
//!
//! Dumps taken from an encrypted server carry table options such as
//! `ENCRYPTION='Y'` that a plain server rejects. These are removed in place.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Remove every literal token from `content`
pub fn strip_tokens(content: &str, tokens: &[String]) -> String {
    tokens
        .iter()
        .filter(|token| !token.is_empty())
        .fold(content.to_string(), |acc, token| acc.replace(token.as_str(), ""))
}

/// `*.sql` files directly inside `dir`, sorted by name
pub fn sql_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let dir_str = dir
        .to_str()
        .ok_or_else(|| Error::Glob(format!("non UTF-8 path: {}", dir.display())))?;
    let pattern = Path::new(&glob::Pattern::escape(dir_str)).join("*.sql");
    let pattern = pattern
        .to_str()
        .ok_or_else(|| Error::Glob(format!("non UTF-8 path: {}", dir.display())))?;

    let mut files = Vec::new();
    for entry in glob::glob(pattern)? {
        let path = entry.map_err(|e| Error::Io(e.into_error()))?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    Ok(files)
}

/// Strip tokens from every `*.sql` file in `dir`, returning the files that changed
pub fn strip_tokens_in_directory(dir: impl AsRef<Path>, tokens: &[String]) -> Result<Vec<PathBuf>> {
    let mut updated = Vec::new();

    for path in sql_files(dir)? {
        let content = fs::read_to_string(&path)?;
        let stripped = strip_tokens(&content, tokens);

        if stripped != content {
            fs::write(&path, stripped)?;
            tracing::info!(path = %path.display(), "Updated file");
            updated.push(path);
        }
    }

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn encryption() -> Vec<String> {
        vec!["ENCRYPTION='Y'".to_string()]
    }

    #[test]
    fn strips_every_occurrence() {
        let sql = "CREATE TABLE a (id INT) ENCRYPTION='Y';\nCREATE TABLE b (id INT) ENCRYPTION='Y';";
        assert_eq!(
            strip_tokens(sql, &encryption()),
            "CREATE TABLE a (id INT) ;\nCREATE TABLE b (id INT) ;"
        );
    }

    #[test]
    fn empty_tokens_are_ignored() {
        assert_eq!(strip_tokens("abc", &[String::new()]), "abc");
    }

    #[test]
    fn rewrites_only_changed_sql_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.sql"), "CREATE TABLE a (id INT) ENCRYPTION='Y';").unwrap();
        fs::write(dir.path().join("b.sql"), "CREATE TABLE b (id INT);").unwrap();
        fs::write(dir.path().join("notes.txt"), "ENCRYPTION='Y'").unwrap();

        let updated = strip_tokens_in_directory(dir.path(), &encryption()).unwrap();

        assert_eq!(updated, vec![dir.path().join("a.sql")]);
        assert_eq!(
            fs::read_to_string(dir.path().join("a.sql")).unwrap(),
            "CREATE TABLE a (id INT) ;"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("notes.txt")).unwrap(),
            "ENCRYPTION='Y'"
        );
    }

    #[test]
    fn lists_sql_files_sorted() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("2_b.sql"), "").unwrap();
        fs::write(dir.path().join("1_a.sql"), "").unwrap();
        fs::create_dir(dir.path().join("3_dir.sql")).unwrap();

        let files = sql_files(dir.path()).unwrap();

        assert_eq!(
            files,
            vec![dir.path().join("1_a.sql"), dir.path().join("2_b.sql")]
        );
    }

    #[test]
    fn directory_names_with_pattern_characters_are_literal() {
        let root = tempdir().unwrap();
        let dir = root.path().join("dump[2024]");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("a.sql"), "CREATE TABLE a (id INT) ENCRYPTION='Y';").unwrap();

        let updated = strip_tokens_in_directory(&dir, &encryption()).unwrap();

        assert_eq!(updated, vec![dir.join("a.sql")]);
        assert_eq!(
            fs::read_to_string(dir.join("a.sql")).unwrap(),
            "CREATE TABLE a (id INT) ;"
        );
    }
}
