use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub spot: SpotConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    /// "text" or "json"
    pub log_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// "redis" or "memory"
    pub backend: String,
    pub redis_url: String,
    /// Prices loaded into the memory backend at startup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_file: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: "redis".to_string(),
            redis_url: "redis://redis:6379".to_string(),
            seed_file: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SpotConfig {
    /// "stub" or "http"
    pub source: String,
    /// Provider whose spot market is consulted
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for SpotConfig {
    fn default() -> Self {
        Self {
            source: "stub".to_string(),
            provider: "aws".to_string(),
            base_url: None,
            timeout_seconds: 10,
        }
    }
}

/// Load configuration: defaults, then the TOML file, then `COST_ENGINE__*`
/// environment variables, then the legacy `REDIS_ADDR` and `PORT` variables.
///
/// Without an explicit path, `config.toml` in the working directory is used
/// when present.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name("config").required(false),
    };

    let (redis_url, port) = legacy_overrides(
        std::env::var("REDIS_ADDR").ok(),
        std::env::var("PORT").ok(),
    );

    let config = config::Config::builder()
        .add_source(file)
        .add_source(config::Environment::with_prefix("COST_ENGINE").separator("__"))
        .set_override_option("store.redis_url", redis_url)?
        .set_override_option("server.port", port)?
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

/// Translate the deployment's bare `REDIS_ADDR` (`host:port`) and `PORT`
fn legacy_overrides(
    redis_addr: Option<String>,
    port: Option<String>,
) -> (Option<String>, Option<String>) {
    let redis_url = redis_addr
        .filter(|addr| !addr.trim().is_empty())
        .map(|addr| {
            if addr.contains("://") {
                addr
            } else {
                format!("redis://{}", addr)
            }
        });
    let port = port.filter(|p| !p.trim().is_empty());
    (redis_url, port)
}

/// Mask the password in a Redis URL for display
///
/// "redis://:secret@host:6379" -> "redis://:***@host:6379"
pub fn mask_url_password(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let Some((userinfo, host)) = rest.rsplit_once('@') else {
        return url.to_string();
    };

    match userinfo.split_once(':') {
        Some((user, _password)) => format!("{}://{}:***@{}", scheme, user, host),
        None => url.to_string(),
    }
}

pub fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.server.port == 0 {
        anyhow::bail!("Server port must be non-zero");
    }

    match cfg.server.log_format.as_str() {
        "text" | "json" => {}
        other => anyhow::bail!("Invalid log format '{}' (expected text or json)", other),
    }

    match cfg.store.backend.as_str() {
        "redis" => {
            if cfg.store.redis_url.is_empty() {
                anyhow::bail!("Redis backend requires store.redis_url");
            }
        }
        "memory" => {}
        other => anyhow::bail!("Invalid store backend '{}' (expected redis or memory)", other),
    }

    match cfg.spot.source.as_str() {
        "stub" => {}
        "http" => {
            if cfg.spot.base_url.as_deref().map_or(true, str::is_empty) {
                anyhow::bail!("HTTP spot source requires spot.base_url");
            }
        }
        other => anyhow::bail!("Invalid spot source '{}' (expected stub or http)", other),
    }

    if cfg.spot.provider.trim().is_empty() {
        anyhow::bail!("Spot provider cannot be empty");
    }

    Ok(())
}
