//! Error types for SchemaDelta

use std::path::PathBuf;

use thiserror::Error;

/// Result type for SchemaDelta operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for SchemaDelta
///
/// The comparator and statement generator never produce these; every variant
/// comes from the I/O around them.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load schema from '{path}': {reason}")]
    SchemaLoad { path: PathBuf, reason: String },

    #[error("Cannot quote identifier '{identifier}': {reason}")]
    IdentifierQuoting { identifier: String, reason: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid file pattern: {0}")]
    Glob(String),

    #[error("Logging setup error: {0}")]
    Logging(String),
}

impl Error {
    /// Build a schema load error for the given source path
    pub fn schema_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::SchemaLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Convert Serde JSON errors to SchemaDelta errors
impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Serialization(error.to_string())
    }
}

/// Convert TOML deserialization errors to SchemaDelta errors
impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Error::Config(error.to_string())
    }
}

impl From<glob::PatternError> for Error {
    fn from(error: glob::PatternError) -> Self {
        Error::Glob(error.to_string())
    }
}
