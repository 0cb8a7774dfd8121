//! Logging utilities for SchemaDelta
//!
//! This module provides logging setup and configuration.

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use tracing::{Level, Subscriber};
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{Error, Result};

/// Parse a configured level name, defaulting to INFO
pub fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Initialize logging based on configuration
///
/// `verbose` forces DEBUG regardless of the configured level. `RUST_LOG`
/// directives are honoured on top of the configured level.
pub fn init_logging(config: Option<&LoggingConfig>, verbose: bool) -> Result<()> {
    let default_config = LoggingConfig::default();
    let config = config.unwrap_or(&default_config);

    let level = if verbose {
        Level::DEBUG
    } else {
        parse_level(&config.level)
    };

    let directive = format!("schema_delta={}", level)
        .parse()
        .map_err(|e| Error::Logging(format!("invalid log directive: {}", e)))?;
    let env_filter = EnvFilter::from_default_env().add_directive(directive);
    let json = config.format.eq_ignore_ascii_case("json");

    if let Some(file_path) = &config.file {
        if let Some(parent) = Path::new(file_path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let writer = Mutex::new(File::create(file_path)?);
        let builder = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_ansi(false)
            .with_writer(writer);

        if json {
            install(builder.json().finish())
        } else {
            install(builder.finish())
        }
    } else if config.stdout {
        let builder = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_target(false);

        if json {
            install(builder.json().finish())
        } else {
            install(builder.finish())
        }
    } else {
        Ok(())
    }
}

fn install<S>(subscriber: S) -> Result<()>
where
    S: Subscriber + Send + Sync + 'static,
{
    tracing::subscriber::set_global_default(subscriber).map_err(|e| Error::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("TRACE"), Level::TRACE);
        assert_eq!(parse_level("warn"), Level::WARN);
        assert_eq!(parse_level("loud"), Level::INFO);
    }
}
