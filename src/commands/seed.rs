use anyhow::{Context, Result};
use colored::Colorize;
use cost_engine::config;
use cost_engine::seed::{apply_seed, SeedDocument};
use cost_engine::store::RedisPriceStore;
use std::path::Path;
use tracing::info;

/// Execute the seed command
///
/// Writes every price in the seed file to the configured Redis store
pub async fn execute(config_path: Option<&Path>, file: &Path) -> Result<()> {
    let cfg = config::load_config(config_path)?;
    if cfg.store.backend != "redis" {
        anyhow::bail!(
            "Seeding requires the redis backend (configured: {}); \
             the memory backend loads store.seed_file at startup",
            cfg.store.backend
        );
    }

    let doc = SeedDocument::load(file)
        .with_context(|| format!("Failed to load seed file {}", file.display()))?;
    info!("Seeding {} into {}", file.display(), cfg.store.redis_url);

    let store = RedisPriceStore::connect(&cfg.store.redis_url).await?;
    let summary = apply_seed(&store, &doc).await?;
    store.close();

    println!(
        "{} {} compute prices, {} egress routes",
        "✓ Seeded".green(),
        summary.compute,
        summary.egress
    );
    Ok(())
}
