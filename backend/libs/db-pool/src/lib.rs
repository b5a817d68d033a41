//! Document database connection pool management
//!
//! Builds a pooled MongoDB client from environment configuration and verifies
//! the server answers before handing the database handle to the service.

pub mod env_utils;

use env_utils::{env_string_or, parse_env_optional, parse_env_with_default};
use mongodb::{
    bson::doc,
    options::ClientOptions,
    Client, Database,
};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

/// Connection string used when `MONGODB_URI` is not set
pub const DEFAULT_MONGODB_URI: &str = "mongodb://127.0.0.1:27017/trip-tide";

/// Database used when neither `MONGODB_DATABASE` nor the URI names one
pub const DEFAULT_DATABASE_NAME: &str = "trip-tide";

#[derive(Debug, Error)]
pub enum DbPoolError {
    #[error("MongoDB driver error: {0}")]
    Driver(#[from] mongodb::error::Error),

    #[error("Database verification timed out after {0}s")]
    Timeout(u64),
}

/// Database connection pool configuration
#[derive(Clone)]
pub struct DbConfig {
    /// Service name reported to the server as the driver app name
    pub service_name: String,
    /// MongoDB connection string
    pub database_url: String,
    /// Explicit database name; falls back to the URI path
    pub database_name: Option<String>,
    /// Maximum number of pooled connections per server
    pub max_pool_size: u32,
    /// Minimum number of pooled connections per server
    pub min_pool_size: u32,
    /// TCP connect timeout
    pub connect_timeout_secs: u64,
    /// How long to wait for a suitable server
    pub server_selection_timeout_secs: u64,
    /// Close connections idle for longer than this
    pub max_idle_time_secs: u64,
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("service_name", &self.service_name)
            .field("database_url", &"[REDACTED]")
            .field("database_name", &self.database_name)
            .field("max_pool_size", &self.max_pool_size)
            .field("min_pool_size", &self.min_pool_size)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field(
                "server_selection_timeout_secs",
                &self.server_selection_timeout_secs,
            )
            .field("max_idle_time_secs", &self.max_idle_time_secs)
            .finish()
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            service_name: String::from("unknown"),
            database_url: DEFAULT_MONGODB_URI.to_string(),
            database_name: None,
            max_pool_size: 10,
            min_pool_size: 0,
            connect_timeout_secs: 5,
            server_selection_timeout_secs: 10,
            max_idle_time_secs: 600,
        }
    }
}

impl DbConfig {
    /// Create a new DbConfig from environment variables
    pub fn from_env(service_name: &str) -> Self {
        let defaults = Self::default();

        Self {
            service_name: service_name.to_string(),
            database_url: env_string_or("MONGODB_URI", DEFAULT_MONGODB_URI),
            database_name: parse_env_optional::<String>("MONGODB_DATABASE")
                .filter(|name| !name.is_empty()),
            max_pool_size: parse_env_with_default("DB_MAX_POOL_SIZE", defaults.max_pool_size),
            min_pool_size: parse_env_with_default("DB_MIN_POOL_SIZE", defaults.min_pool_size),
            connect_timeout_secs: parse_env_with_default(
                "DB_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout_secs,
            ),
            server_selection_timeout_secs: parse_env_with_default(
                "DB_SERVER_SELECTION_TIMEOUT_SECS",
                defaults.server_selection_timeout_secs,
            ),
            max_idle_time_secs: parse_env_with_default(
                "DB_MAX_IDLE_TIME_SECS",
                defaults.max_idle_time_secs,
            ),
        }
    }

    /// Copy pool settings onto parsed driver options
    pub fn apply(&self, options: &mut ClientOptions) {
        options.app_name = Some(self.service_name.clone());
        options.max_pool_size = Some(self.max_pool_size);
        options.min_pool_size = Some(self.min_pool_size);
        options.connect_timeout = Some(Duration::from_secs(self.connect_timeout_secs));
        options.server_selection_timeout =
            Some(Duration::from_secs(self.server_selection_timeout_secs));
        options.max_idle_time = Some(Duration::from_secs(self.max_idle_time_secs));
    }

    /// Database name: explicit setting, then URI path, then the default
    pub fn resolve_database_name(&self, options: &ClientOptions) -> String {
        self.database_name
            .clone()
            .or_else(|| options.default_database.clone())
            .unwrap_or_else(|| DEFAULT_DATABASE_NAME.to_string())
    }

    /// Log pool configuration details
    pub fn log_config(&self) {
        info!(
            service = %self.service_name,
            max_pool_size = self.max_pool_size,
            min_pool_size = self.min_pool_size,
            connect_timeout_secs = self.connect_timeout_secs,
            server_selection_timeout_secs = self.server_selection_timeout_secs,
            max_idle_time_secs = self.max_idle_time_secs,
            "Database pool configuration"
        );
    }
}

/// Connect a pooled client and return the configured database after a ping
pub async fn create_database(config: &DbConfig) -> Result<Database, DbPoolError> {
    let mut options = ClientOptions::parse(&config.database_url).await?;
    config.apply(&mut options);
    let database_name = config.resolve_database_name(&options);

    debug!(
        service = %config.service_name,
        database = %database_name,
        "Creating database client"
    );

    let client = Client::with_options(options)?;
    let database = client.database(&database_name);

    match tokio::time::timeout(
        Duration::from_secs(config.connect_timeout_secs),
        database.run_command(doc! { "ping": 1 }),
    )
    .await
    {
        Ok(Ok(_)) => {
            info!(
                service = %config.service_name,
                database = %database_name,
                "Database client created and verified successfully"
            );
            Ok(database)
        }
        Ok(Err(e)) => {
            error!(
                service = %config.service_name,
                error = %e,
                "Database connection verification failed"
            );
            Err(e.into())
        }
        Err(_) => {
            error!(
                service = %config.service_name,
                timeout_secs = config.connect_timeout_secs,
                "Database connection verification timeout"
            );
            Err(DbPoolError::Timeout(config.connect_timeout_secs))
        }
    }
}
