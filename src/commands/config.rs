use anyhow::Result;
use colored::Colorize;
use cost_engine::config::{self, mask_url_password, Config};
use std::path::Path;
use tracing::info;

/// Execute the config show command
///
/// Displays the effective configuration after file and environment overrides
pub fn show(config_path: Option<&Path>) -> Result<()> {
    info!("Loading configuration for display");

    let cfg = config::load_config(config_path)?;
    let sanitized = sanitize_secrets(&cfg);

    println!("{}", "Current Configuration:".green().bold());
    println!();
    println!("{}", toml::to_string_pretty(&sanitized)?);

    Ok(())
}

/// Execute the config validate command
pub fn validate(config_path: Option<&Path>) -> Result<()> {
    println!("{}", "Validating configuration...".yellow());

    let cfg = config::load_config(config_path)?;

    println!("{}", "✓ Configuration is valid".green());
    println!();
    println!("{}", "Summary:".bold());
    println!("  Listen: {}:{}", cfg.server.host, cfg.server.port);
    println!("  Store: {}", cfg.store.backend);
    println!("  Spot: {} ({})", cfg.spot.source, cfg.spot.provider);

    Ok(())
}

/// Mask the password in the Redis URL for safe display
fn sanitize_secrets(cfg: &Config) -> Config {
    let mut sanitized = cfg.clone();
    sanitized.store.redis_url = mask_url_password(&cfg.store.redis_url);
    sanitized
}
