//! Configuration for the Trip Tide API
//!
//! Loads settings from:
//! 1. Environment variables
//! 2. .env file (local development)

use anyhow::{bail, Context, Result};
use db_pool::env_utils::{env_string_or, parse_env_list, parse_env_with_default};
use db_pool::DbConfig;
use std::fmt;
use std::str::FromStr;

pub const SERVICE_NAME: &str = "trip-tide-api";

#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Which repositories back the API
    pub store_backend: StoreBackend,

    /// MongoDB connection pool
    pub database: DbConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// GraphQL configuration
    pub graphql: GraphQLConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    /// Browser origins allowed by CORS; empty allows any origin
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Mongo,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(Self::Mongo),
            "memory" | "in-memory" => Ok(Self::Memory),
            other => bail!("Unknown STORE_BACKEND '{}', expected 'mongo' or 'memory'", other),
        }
    }
}

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub expiry_seconds: i64,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("expiry_seconds", &self.expiry_seconds)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphQLConfig {
    /// Enable GraphQL Playground
    pub playground: bool,
    /// Max query depth
    pub max_depth: usize,
    /// Max query complexity
    pub max_complexity: usize,
    /// Enable introspection
    pub introspection: bool,
}

impl Default for GraphQLConfig {
    fn default() -> Self {
        Self {
            playground: true,
            max_depth: 10,
            max_complexity: 1000,
            introspection: true,
        }
    }
}

impl Config {
    /// Load configuration from the environment, reading `.env` first
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let store_backend = env_string_or("STORE_BACKEND", "mongo")
            .parse()
            .context("Invalid STORE_BACKEND")?;

        let graphql_defaults = GraphQLConfig::default();

        Ok(Self {
            server: ServerConfig {
                host: env_string_or("SERVER_HOST", "0.0.0.0"),
                port: parse_env_with_default("SERVER_PORT", 3001),
                workers: parse_env_with_default("SERVER_WORKERS", num_cpus::get()),
                cors_allowed_origins: parse_env_list("CORS_ALLOWED_ORIGINS"),
            },
            store_backend,
            database: DbConfig::from_env(SERVICE_NAME),
            jwt: Self::jwt_from_env()?,
            graphql: GraphQLConfig {
                playground: parse_env_with_default("GRAPHQL_PLAYGROUND", graphql_defaults.playground),
                max_depth: parse_env_with_default("GRAPHQL_MAX_DEPTH", graphql_defaults.max_depth),
                max_complexity: parse_env_with_default(
                    "GRAPHQL_MAX_COMPLEXITY",
                    graphql_defaults.max_complexity,
                ),
                introspection: parse_env_with_default(
                    "GRAPHQL_INTROSPECTION",
                    graphql_defaults.introspection,
                ),
            },
        })
    }

    /// Load JWT configuration from environment variables
    fn jwt_from_env() -> Result<JwtConfig> {
        let secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        if secret.trim().is_empty() {
            bail!("JWT_SECRET must not be empty");
        }

        let expiry_seconds = match std::env::var("JWT_EXPIRY_SECONDS") {
            Ok(raw) => raw
                .trim()
                .parse()
                .context("Invalid JWT_EXPIRY_SECONDS")?,
            Err(_) => crypto_core::jwt::DEFAULT_EXPIRY_SECONDS,
        };

        Ok(JwtConfig {
            secret,
            issuer: env_string_or("JWT_ISSUER", "trip-tide"),
            expiry_seconds,
        })
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.server.host.clone(), self.server.port)
    }
}
