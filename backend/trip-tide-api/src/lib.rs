//! Trip Tide API library
//! Re-exports modules for the server binary, tools and integration tests

pub mod config;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod schema;
pub mod seed;
pub mod services;
pub mod store;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::prelude::*;

use config::{Config, StoreBackend};
use store::Store;

/// Initialize JSON structured logging; `RUST_LOG` overrides `default_directives`
pub fn init_tracing(default_directives: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directives.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_file(true)
                .with_target(true),
        )
        .init();
}

/// Open the configured store backend
pub async fn open_store(config: &Config) -> Result<Store> {
    match config.store_backend {
        StoreBackend::Memory => {
            info!("Using in-memory store; data is lost on restart");
            Ok(Store::in_memory())
        }
        StoreBackend::Mongo => {
            config.database.log_config();
            let database = db_pool::create_database(&config.database)
                .await
                .context("Failed to connect to MongoDB")?;
            Store::mongo(database)
                .await
                .context("Failed to prepare MongoDB collections")
        }
    }
}
