use anyhow::Result;
use colored::Colorize;
use cost_engine::{config, init_tracing, server};
use std::path::Path;
use tracing::info;

/// Execute the serve command
///
/// Loads configuration, initializes logging from it, then runs the
/// server until SIGTERM/SIGINT.
pub async fn execute(config_path: Option<&Path>) -> Result<()> {
    let cfg = config::load_config(config_path)?;
    init_tracing(&cfg.server.log_level, &cfg.server.log_format);

    println!("{}", "Starting cost engine...".green());
    info!(
        "Starting cost engine v{} on {}:{}",
        env!("CARGO_PKG_VERSION"),
        cfg.server.host,
        cfg.server.port
    );

    server::start_server(cfg).await
}
