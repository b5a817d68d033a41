//! Load the place catalogue into MongoDB
//!
//! Usage: `seed-places [path/to/places.json]` (default `seeds/places.json`).
//! Reads `MONGODB_URI` / `MONGODB_DATABASE` like the API server.

use anyhow::{Context, Result};
use db_pool::DbConfig;
use std::path::PathBuf;
use tracing::info;

use trip_tide_api::seed::{read_places, seed_places};
use trip_tide_api::store::Store;

const DEFAULT_SEED_FILE: &str = "seeds/places.json";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    trip_tide_api::init_tracing("info,seed_places=debug,trip_tide_api=info");

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SEED_FILE));

    let entries = read_places(&path)?;
    info!(path = %path.display(), entries = entries.len(), "Loaded place catalogue");

    let config = DbConfig::from_env("trip-tide-seed");
    config.log_config();
    let database = db_pool::create_database(&config)
        .await
        .context("Failed to connect to MongoDB")?;
    let store = Store::mongo(database)
        .await
        .context("Failed to prepare MongoDB collections")?;

    let stats = seed_places(&store, entries).await?;
    info!(
        upserted = stats.upserted,
        skipped = stats.skipped,
        "Place seeding finished"
    );
    Ok(())
}
