//! Database module - AppState and database operations
//!
//! This module is split into submodules for better separation of concerns:
//! - `user` - account and session queries used by authentication
//! - `contract` - contract CRUD and search, always scoped to the owning user

mod contract;
mod user;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Connect to the configured database and apply pending migrations.
    pub async fn new_with_config(config: AppConfig) -> Result<Self, sqlx::Error> {
        let pool = connect(&config.database_url).await?;
        let state = Self::new_with_pool(pool, config);
        state.migrate().await?;
        Ok(state)
    }

    pub fn new_with_pool(pool: SqlitePool, config: AppConfig) -> Self {
        Self {
            pool,
            config: Arc::new(config),
        }
    }

    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// Open a pool for `database_url`.
///
/// In-memory databases live only as long as their connection, so they get a
/// single connection that is never recycled.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.foreign_keys(true);

    if database_url.contains(":memory:") {
        return SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await;
    }

    SqlitePoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(900))
        .max_lifetime(Duration::from_secs(1800))
        .connect_with(options)
        .await
}

#[cfg(test)]
pub(crate) async fn test_state() -> AppState {
    let config = AppConfig {
        database_url: "sqlite::memory:".to_string(),
        bcrypt_cost: 4,
        ..AppConfig::default()
    };
    AppState::new_with_config(config)
        .await
        .expect("in-memory database")
}
