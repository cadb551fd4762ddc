//! Price ingestion from seed documents
//!
//! ```toml
//! [[compute]]
//! provider = "aws"
//! region = "us-east-1"
//! instance_type = "p5.48xlarge"
//! gpu_type = "H100"
//! gpu_count = 8
//! cost_per_hour = 98.32
//! gpu_memory_gb = 80
//! interconnect = "efa"
//!
//! [[egress]]
//! source = "aws:s3:us-east-1"
//! cost_per_gb = 0.09            # no destination: internet route
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

use crate::keys::{egress_route_key, internet_egress_key, parse_location, KeyFormatError};
use crate::pricing::models::{ComputePrice, EgressPrice};
use crate::store::{PriceSink, StoreError};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse seed file: {0}")]
    Parse(String),

    #[error("unsupported seed file extension: {0} (expected .toml or .json)")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Format(#[from] KeyFormatError),

    #[error("invalid seed entry: {0}")]
    Invalid(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeEntry {
    pub provider: String,
    pub region: String,
    pub instance_type: String,
    pub gpu_type: String,
    pub gpu_count: u32,
    pub cost_per_hour: f64,
    #[serde(default)]
    pub gpu_memory_gb: Option<u32>,
    #[serde(default)]
    pub interconnect: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EgressEntry {
    /// Data location, `provider:service:region`
    pub source: String,
    #[serde(default)]
    pub dest_provider: Option<String>,
    #[serde(default)]
    pub dest_region: Option<String>,
    pub cost_per_gb: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedDocument {
    #[serde(default)]
    pub compute: Vec<ComputeEntry>,
    #[serde(default)]
    pub egress: Vec<EgressEntry>,
}

/// Records written by [`apply_seed`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub compute: usize,
    pub egress: usize,
}

impl SeedDocument {
    /// Read a seed document, choosing the format by file extension
    pub fn load(path: &Path) -> Result<Self, SeedError> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml(&content),
            Some("json") => Self::from_json(&content),
            other => Err(SeedError::UnsupportedFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, SeedError> {
        toml::from_str(content).map_err(|e| SeedError::Parse(e.to_string()))
    }

    pub fn from_json(content: &str) -> Result<Self, SeedError> {
        serde_json::from_str(content).map_err(|e| SeedError::Parse(e.to_string()))
    }
}

/// Resolve every egress entry to its route key before anything is written
fn egress_routes(doc: &SeedDocument) -> Result<Vec<(String, EgressPrice)>, SeedError> {
    doc.egress
        .iter()
        .map(|entry| {
            let source = parse_location(&entry.source)?;
            let route = match (&entry.dest_provider, &entry.dest_region) {
                (Some(provider), Some(region)) => egress_route_key(&source, provider, region),
                (None, None) => internet_egress_key(&source),
                _ => {
                    return Err(SeedError::Invalid(format!(
                        "egress from {} needs both dest_provider and dest_region, or neither",
                        entry.source
                    )))
                }
            };
            Ok((
                route,
                EgressPrice {
                    cost_per_gb: entry.cost_per_gb,
                },
            ))
        })
        .collect()
}

fn validate_compute(entry: &ComputeEntry) -> Result<(), SeedError> {
    let blank = [
        &entry.provider,
        &entry.region,
        &entry.instance_type,
        &entry.gpu_type,
    ]
    .iter()
    .any(|field| field.trim().is_empty() || field.contains(':'));

    if blank || entry.gpu_count == 0 {
        return Err(SeedError::Invalid(format!(
            "compute entry {}:{}:{} has an empty or malformed field",
            entry.provider, entry.region, entry.instance_type
        )));
    }
    Ok(())
}

/// Write a seed document into a price sink.
///
/// The whole document is validated first; a malformed location or entry
/// writes nothing.
pub async fn apply_seed(
    sink: &dyn PriceSink,
    doc: &SeedDocument,
) -> Result<SeedSummary, SeedError> {
    let routes = egress_routes(doc)?;
    for entry in &doc.compute {
        validate_compute(entry)?;
    }

    for entry in &doc.compute {
        let price = ComputePrice {
            provider: entry.provider.clone(),
            region: entry.region.clone(),
            instance_type: entry.instance_type.clone(),
            cost_per_hour: entry.cost_per_hour,
            gpu_count: entry.gpu_count,
            gpu_memory_gb: entry.gpu_memory_gb,
            interconnect: entry.interconnect.clone(),
        };
        sink.set_compute_price(&price).await?;
        sink.add_instance_to_gpu_map(&entry.gpu_type, entry.gpu_count, &price.instance_key())
            .await?;
        debug!(key = %price.instance_key(), "Seeded compute price");
    }

    for (route, price) in &routes {
        sink.set_egress_price(route, price).await?;
        debug!(route = %route, "Seeded egress price");
    }

    let summary = SeedSummary {
        compute: doc.compute.len(),
        egress: routes.len(),
    };
    info!(
        "Seeded {} compute prices and {} egress routes",
        summary.compute, summary.egress
    );
    Ok(summary)
}
