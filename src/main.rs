use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cost_engine::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let config_path = args.config.as_deref();

    // The server configures logging from its own config file
    let command = args.get_command();
    if !matches!(command, cli::Commands::Serve) {
        init_tracing("warn", "text");
    }

    match command {
        cli::Commands::Serve => {
            commands::serve::execute(config_path).await?;
        }
        cli::Commands::Analyze { file, api_url } => {
            commands::analyze::execute(&file, &api_url).await?;
        }
        cli::Commands::Seed { file } => {
            commands::seed::execute(config_path, &file).await?;
        }
        cli::Commands::Test => {
            commands::test::execute(config_path)?;
        }
        cli::Commands::Config { action } => match action {
            cli::ConfigCommands::Show => commands::config::show(config_path)?,
            cli::ConfigCommands::Validate => commands::config::validate(config_path)?,
        },
        cli::Commands::Version => {
            println!("Cost Engine v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
