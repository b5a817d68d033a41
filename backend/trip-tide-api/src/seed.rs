//! Place catalogue seeding

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

use crate::models::validation::validate_input;
use crate::models::NewPlace;
use crate::store::Store;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedStats {
    pub upserted: usize,
    pub skipped: usize,
}

/// Parse a JSON array of catalogue entries
pub fn read_places(path: &Path) -> Result<Vec<NewPlace>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid place list in {}", path.display()))
}

/// Upsert every valid entry; invalid ones are logged and skipped
pub async fn seed_places(store: &Store, entries: Vec<NewPlace>) -> Result<SeedStats> {
    let mut stats = SeedStats::default();

    for entry in entries {
        let entry = entry.normalize();
        if let Err(e) = validate_input(&entry) {
            warn!(place_id = %entry.place_id, error = %e, "Skipping invalid place");
            stats.skipped += 1;
            continue;
        }

        let place = store
            .places
            .upsert(&entry)
            .await
            .with_context(|| format!("Failed to upsert place {}", entry.place_id))?;
        info!(place_id = %place.place_id, id = %place.id, "Place upserted");
        stats.upserted += 1;
    }

    Ok(stats)
}
