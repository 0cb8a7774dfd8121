//! Database connection handling
//!
//! This module provides functionality to establish and manage MySQL connections.

use std::time::Duration;

use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use sqlx::Executor;

use crate::config::DatabaseConfig;
use crate::error::Result;
use crate::utils::naming::{quote_identifier, validate_identifier};

/// A pooled MySQL connection
#[derive(Debug, Clone)]
pub struct DatabaseConnection {
    pool: MySqlPool,
}

impl DatabaseConnection {
    /// Connect to the configured database
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let options = config.url.parse::<MySqlConnectOptions>()?.database(&config.name);
        Self::connect_with(config, options).await
    }

    /// Connect to the server without selecting a database
    pub async fn connect_server(config: &DatabaseConfig) -> Result<Self> {
        let options = config.url.parse::<MySqlConnectOptions>()?;
        Self::connect_with(config, options).await
    }

    async fn connect_with(config: &DatabaseConfig, options: MySqlConnectOptions) -> Result<Self> {
        let pool_size = config.pool_size.unwrap_or(10);
        let timeout_seconds = config.timeout_seconds.unwrap_or(30);

        let pool = MySqlPoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(Duration::from_secs(timeout_seconds))
            .connect_with(options)
            .await?;

        tracing::debug!(pool_size, "Connected to MySQL");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Execute a SQL statement as-is
    pub async fn execute(&self, sql: &str) -> Result<u64> {
        let result = self.pool.execute(sql).await?;
        Ok(result.rows_affected())
    }

    pub async fn create_database(&self, name: &str) -> Result<()> {
        validate_identifier(name)?;
        self.execute(&format!("CREATE DATABASE IF NOT EXISTS {}", quote_identifier(name)))
            .await?;
        tracing::info!(database = %name, "Database ensured");
        Ok(())
    }

    pub async fn drop_database(&self, name: &str) -> Result<()> {
        validate_identifier(name)?;
        self.execute(&format!("DROP DATABASE {}", quote_identifier(name)))
            .await?;
        tracing::info!(database = %name, "Database dropped");
        Ok(())
    }

    pub async fn close(self) {
        self.pool.close().await;
        tracing::debug!("Database connection closed");
    }
}
