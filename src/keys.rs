//! Location and instance key parsing
//!
//! Data locations are written as `provider:service:region` (e.g. `aws:s3:us-east-1`)
//! and priceable SKUs as `provider:region:instance_type`. Both formats split on
//! `:` and drop empty runs, so `aws::s3:us-east-1` parses the same as
//! `aws:s3:us-east-1`.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Sentinel destination used for all inter-cloud egress routes
pub const INTERNET: &str = "INTERNET";

/// Malformed location or instance key
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyFormatError {
    #[error("invalid location format: expected provider:service:region, got {0}")]
    Location(String),

    #[error("invalid instance key format: expected provider:region:instance_type, got {0}")]
    InstanceKey(String),
}

/// Where the job's data currently resides
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub provider: String,
    pub service: String,
    pub region: String,
}

/// Identifies a priceable compute SKU
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceKey {
    pub provider: String,
    pub region: String,
    pub instance_type: String,
}

/// Split on `:` keeping only non-empty segments; `None` unless exactly three remain.
fn split_three(s: &str) -> Option<(String, String, String)> {
    let mut parts = s.split(':').filter(|part| !part.is_empty());
    let first = parts.next()?;
    let second = parts.next()?;
    let third = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some((first.to_string(), second.to_string(), third.to_string()))
}

/// Parse a `provider:service:region` location string
pub fn parse_location(s: &str) -> Result<Location, KeyFormatError> {
    let (provider, service, region) =
        split_three(s).ok_or_else(|| KeyFormatError::Location(s.to_string()))?;
    Ok(Location {
        provider,
        service,
        region,
    })
}

/// Parse a `provider:region:instance_type` instance key
pub fn parse_instance_key(s: &str) -> Result<InstanceKey, KeyFormatError> {
    let (provider, region, instance_type) =
        split_three(s).ok_or_else(|| KeyFormatError::InstanceKey(s.to_string()))?;
    Ok(InstanceKey {
        provider,
        region,
        instance_type,
    })
}

impl FromStr for Location {
    type Err = KeyFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_location(s)
    }
}

impl FromStr for InstanceKey {
    type Err = KeyFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_instance_key(s)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.provider, self.service, self.region)
    }
}

impl fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.provider, self.region, self.instance_type)
    }
}

impl InstanceKey {
    pub fn new(
        provider: impl Into<String>,
        region: impl Into<String>,
        instance_type: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            region: region.into(),
            instance_type: instance_type.into(),
        }
    }

    /// True if this SKU runs in the same provider and region as the data
    pub fn is_co_located(&self, location: &Location) -> bool {
        self.provider == location.provider && self.region == location.region
    }
}

/// Store key of the pre-grouped candidate set for a GPU requirement
pub fn gpu_map_key(gpu_type: &str, gpu_count: u32) -> String {
    format!("gpu_map:{}:{}", gpu_type, gpu_count)
}

/// Store key of a compute price record
pub fn compute_key(key: &InstanceKey) -> String {
    format!(
        "compute:{}:{}:{}",
        key.provider, key.region, key.instance_type
    )
}

/// Directional egress route key from the data location to a destination.
///
/// Intra-cloud routes name the destination provider and region. Inter-cloud
/// routes end in [`INTERNET`] regardless of destination, so every other cloud
/// is priced identically from a given source.
pub fn egress_route_key(source: &Location, dest_provider: &str, dest_region: &str) -> String {
    if source.provider == dest_provider {
        format!(
            "egress:{}:{}:{}:{}:{}",
            source.provider, source.service, source.region, dest_provider, dest_region
        )
    } else {
        internet_egress_key(source)
    }
}

/// Egress route key for traffic leaving the source's cloud
pub fn internet_egress_key(source: &Location) -> String {
    format!(
        "egress:{}:{}:{}:{}",
        source.provider, source.service, source.region, INTERNET
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_location() {
        let loc = parse_location("aws:s3:us-east-1").unwrap();
        assert_eq!(loc.provider, "aws");
        assert_eq!(loc.service, "s3");
        assert_eq!(loc.region, "us-east-1");

        let loc = parse_location("gcp:gcs:us-central1").unwrap();
        assert_eq!(
            (loc.provider.as_str(), loc.service.as_str(), loc.region.as_str()),
            ("gcp", "gcs", "us-central1")
        );
    }

    #[test]
    fn test_parse_location_wrong_arity() {
        assert_eq!(
            parse_location("invalid"),
            Err(KeyFormatError::Location("invalid".to_string()))
        );
        assert!(parse_location("aws:s3").is_err());
        assert!(parse_location("aws:s3:us-east-1:extra").is_err());
        assert!(parse_location("").is_err());
        assert!(parse_location(":::").is_err());
    }

    #[test]
    fn test_empty_segments_are_dropped() {
        let loc = parse_location("aws::s3:us-east-1").unwrap();
        assert_eq!(loc.service, "s3");

        let key = parse_instance_key(":aws:us-east-1::p5.48xlarge:").unwrap();
        assert_eq!(key, InstanceKey::new("aws", "us-east-1", "p5.48xlarge"));

        // "a::b" only has two non-empty runs
        assert!(parse_instance_key("a::b").is_err());
    }

    #[test]
    fn test_parse_instance_key() {
        let key = parse_instance_key("aws:us-east-1:p5.48xlarge").unwrap();
        assert_eq!(key.provider, "aws");
        assert_eq!(key.region, "us-east-1");
        assert_eq!(key.instance_type, "p5.48xlarge");

        let key: InstanceKey = "gcp:us-central1:a3-highgpu-8g".parse().unwrap();
        assert_eq!(key.instance_type, "a3-highgpu-8g");

        assert!(matches!(
            parse_instance_key("invalid"),
            Err(KeyFormatError::InstanceKey(_))
        ));
    }

    #[test]
    fn test_instance_key_display_recovers_input() {
        for raw in [
            "aws:us-east-1:p5.48xlarge",
            "gcp:us-central1:a3-highgpu-8g",
            "azure:eastus:Standard_ND96isr_H100_v5",
        ] {
            let key = parse_instance_key(raw).unwrap();
            assert_eq!(key.to_string(), raw);
            assert_eq!(parse_instance_key(&key.to_string()).unwrap(), key);
        }
    }

    #[test]
    fn test_is_co_located() {
        let loc = parse_location("aws:s3:us-east-1").unwrap();
        assert!(InstanceKey::new("aws", "us-east-1", "p5.48xlarge").is_co_located(&loc));
        assert!(!InstanceKey::new("aws", "us-west-2", "p5.48xlarge").is_co_located(&loc));
        assert!(!InstanceKey::new("gcp", "us-east-1", "a3-highgpu-8g").is_co_located(&loc));
    }

    #[test]
    fn test_store_keys() {
        assert_eq!(gpu_map_key("H100", 8), "gpu_map:H100:8");
        assert_eq!(
            compute_key(&InstanceKey::new("aws", "us-east-1", "p5.48xlarge")),
            "compute:aws:us-east-1:p5.48xlarge"
        );
    }

    #[test]
    fn test_egress_route_key_intra_cloud() {
        let source = parse_location("aws:s3:us-east-1").unwrap();
        let key = egress_route_key(&source, "aws", "us-west-2");
        assert_eq!(key, "egress:aws:s3:us-east-1:aws:us-west-2");
        // prefix + five segments
        assert_eq!(key.split(':').count(), 6);
    }

    #[test]
    fn test_egress_route_key_inter_cloud_ignores_destination() {
        let source = parse_location("aws:s3:us-east-1").unwrap();
        let to_gcp = egress_route_key(&source, "gcp", "us-central1");
        let to_azure = egress_route_key(&source, "azure", "westeurope");
        assert_eq!(to_gcp, "egress:aws:s3:us-east-1:INTERNET");
        assert_eq!(to_gcp, to_azure);
        // prefix + four segments
        assert_eq!(to_gcp.split(':').count(), 5);
    }
}
