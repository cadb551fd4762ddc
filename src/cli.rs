use clap::{Parser, Subcommand};
use std::path::PathBuf;

use cost_engine::client::DEFAULT_API_URL;

#[derive(Parser, Debug)]
#[command(name = "cost-engine", version, about = "GPU job cost analysis engine")]
pub struct Cli {
    /// Configuration file path (defaults to ./config.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the analysis server (default)
    Serve,

    /// Analyze a job description against a running server
    Analyze {
        /// Job file (.toml or .json)
        #[arg(short, long)]
        file: PathBuf,

        /// Base URL of the cost engine API
        #[arg(long, env = "COST_ENGINE_API_URL", default_value = DEFAULT_API_URL)]
        api_url: String,
    },

    /// Load a price seed file into the configured Redis store
    Seed {
        /// Seed file (.toml or .json)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Test configuration file validity
    Test,

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Display the effective configuration
    Show,

    /// Validate configuration file
    Validate,
}

impl Cli {
    /// Get the command to execute, defaulting to Serve if none provided
    pub fn get_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_serve() {
        let cli = Cli {
            config: None,
            command: None,
        };

        assert!(matches!(cli.get_command(), Commands::Serve));
    }

    #[test]
    fn test_cli_parsing_analyze() {
        let args = vec![
            "cost-engine",
            "analyze",
            "--file",
            "job.toml",
            "--api-url",
            "http://engine:9000",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.get_command() {
            Commands::Analyze { file, api_url } => {
                assert_eq!(file, PathBuf::from("job.toml"));
                assert_eq!(api_url, "http://engine:9000");
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_cli_parsing_seed_with_global_config() {
        let args = vec!["cost-engine", "seed", "-f", "prices.toml", "--config", "prod.toml"];
        let cli = Cli::try_parse_from(args).unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("prod.toml")));
        assert!(matches!(cli.get_command(), Commands::Seed { .. }));
    }

    #[test]
    fn test_cli_parsing_config_show() {
        let args = vec!["cost-engine", "config", "show"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.get_command() {
            Commands::Config { action } => {
                assert!(matches!(action, ConfigCommands::Show));
            }
            _ => panic!("Expected Config command"),
        }
    }
}
