//! Hardware resolution: GPU requirement -> candidate instance set

use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::EngineError;
use crate::keys::{parse_instance_key, parse_location, InstanceKey};
use crate::store::PriceStore;

/// Optional hardware filters on top of GPU type and count
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HardwareFilter {
    pub gpu_memory_gb: Option<u32>,
    pub interconnect: Option<String>,
}

impl HardwareFilter {
    pub fn is_empty(&self) -> bool {
        self.gpu_memory_gb.is_none() && self.interconnect.is_none()
    }
}

/// Resolves GPU requirements into priceable instances
pub struct HardwareResolver {
    store: Arc<dyn PriceStore>,
}

impl HardwareResolver {
    pub fn new(store: Arc<dyn PriceStore>) -> Self {
        Self { store }
    }

    /// Candidate instances for a GPU type and exact count.
    ///
    /// The store's GPU map is already grouped by exact count. Optional filters
    /// require an exact match on the stored record; a record lacking a filtered
    /// attribute is excluded. Candidates whose record is missing or malformed
    /// are skipped. An empty result is not an error.
    pub async fn resolve_instances(
        &self,
        gpu_type: &str,
        gpu_count: u32,
        filter: &HardwareFilter,
    ) -> Result<Vec<InstanceKey>, EngineError> {
        let raw_keys = self.store.instances_for_gpu(gpu_type, gpu_count).await?;

        let candidates: Vec<InstanceKey> = raw_keys
            .iter()
            .filter_map(|raw| match parse_instance_key(raw) {
                Ok(key) => Some(key),
                Err(e) => {
                    warn!(key = %raw, "Skipping candidate: {}", e);
                    None
                }
            })
            .collect();

        if filter.is_empty() || candidates.is_empty() {
            return Ok(candidates);
        }

        let mut filtered = Vec::with_capacity(candidates.len());
        for key in candidates {
            let price = match self.store.compute_price(&key).await {
                Ok(Some(price)) => price,
                Ok(None) => {
                    warn!(key = %key, "Compute price not found, skipping candidate");
                    continue;
                }
                Err(e) => {
                    warn!(key = %key, "Failed to get compute price, skipping candidate: {}", e);
                    continue;
                }
            };

            if let Some(memory) = filter.gpu_memory_gb {
                if price.gpu_memory_gb != Some(memory) {
                    debug!(key = %key, "Filtered out by gpu_memory_gb");
                    continue;
                }
            }

            if let Some(interconnect) = &filter.interconnect {
                if price.interconnect.as_ref() != Some(interconnect) {
                    debug!(key = %key, "Filtered out by interconnect");
                    continue;
                }
            }

            filtered.push(key);
        }

        Ok(filtered)
    }
}

/// First candidate, in the given order, that shares the data's provider and region
pub fn find_data_local_instance(
    location: &str,
    candidates: &[InstanceKey],
) -> Result<InstanceKey, EngineError> {
    let source = parse_location(location)?;

    candidates
        .iter()
        .find(|key| key.is_co_located(&source))
        .cloned()
        .ok_or_else(|| EngineError::DataLocalNotFound(location.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::models::ComputePrice;
    use crate::store::{MemoryPriceStore, PriceSink};

    fn price(key: &str, memory: Option<u32>, interconnect: Option<&str>) -> ComputePrice {
        let key = parse_instance_key(key).unwrap();
        ComputePrice {
            provider: key.provider,
            region: key.region,
            instance_type: key.instance_type,
            cost_per_hour: 10.0,
            gpu_count: 8,
            gpu_memory_gb: memory,
            interconnect: interconnect.map(str::to_string),
        }
    }

    async fn store_with(prices: &[ComputePrice]) -> Arc<MemoryPriceStore> {
        let store = Arc::new(MemoryPriceStore::new());
        for p in prices {
            store.set_compute_price(p).await.unwrap();
            store
                .add_instance_to_gpu_map("H100", 8, &p.instance_key())
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_resolve_without_filters_returns_all() {
        let store = store_with(&[
            price("aws:us-east-1:p5.48xlarge", Some(80), Some("efa")),
            price("gcp:us-central1:a3-highgpu-8g", None, None),
        ])
        .await;
        // A member without a price record is still a candidate when unfiltered
        store.add_raw_member("gpu_map:H100:8", "azure:eastus:nd96");

        let resolver = HardwareResolver::new(store);
        let keys = resolver
            .resolve_instances("H100", 8, &HardwareFilter::default())
            .await
            .unwrap();

        assert_eq!(keys.len(), 3);
        assert_eq!(keys[2].to_string(), "azure:eastus:nd96");
    }

    #[tokio::test]
    async fn test_resolve_empty_group_is_not_error() {
        let resolver = HardwareResolver::new(Arc::new(MemoryPriceStore::new()));
        let keys = resolver
            .resolve_instances("B200", 8, &HardwareFilter::default())
            .await
            .unwrap();
        assert!(keys.is_empty());
    }

    #[tokio::test]
    async fn test_memory_filter_excludes_missing_and_different() {
        let store = store_with(&[
            price("aws:us-east-1:p5.48xlarge", Some(80), None),
            price("aws:us-west-2:p5e.48xlarge", Some(141), None),
            price("gcp:us-central1:a3-highgpu-8g", None, None),
        ])
        .await;

        let resolver = HardwareResolver::new(store);
        let filter = HardwareFilter {
            gpu_memory_gb: Some(80),
            interconnect: None,
        };
        let keys = resolver.resolve_instances("H100", 8, &filter).await.unwrap();

        assert_eq!(keys, vec![InstanceKey::new("aws", "us-east-1", "p5.48xlarge")]);
    }

    #[tokio::test]
    async fn test_both_filters_must_match() {
        let store = store_with(&[
            price("aws:us-east-1:p5.48xlarge", Some(80), Some("efa")),
            price("gcp:us-central1:a3-highgpu-8g", Some(80), Some("infiniband")),
            price("azure:eastus:nd96isr", Some(80), None),
        ])
        .await;

        let resolver = HardwareResolver::new(store);
        let filter = HardwareFilter {
            gpu_memory_gb: Some(80),
            interconnect: Some("infiniband".to_string()),
        };
        let keys = resolver.resolve_instances("H100", 8, &filter).await.unwrap();

        assert_eq!(keys, vec![InstanceKey::new("gcp", "us-central1", "a3-highgpu-8g")]);
    }

    #[tokio::test]
    async fn test_filtering_skips_missing_and_malformed_records() {
        let store = store_with(&[price("aws:us-east-1:p5.48xlarge", Some(80), None)]).await;
        store.add_raw_member("gpu_map:H100:8", "gcp:us-central1:a3-highgpu-8g");
        store.add_raw_member("gpu_map:H100:8", "azure:eastus:nd96");
        store.insert_raw("compute:azure:eastus:nd96", "not-json");
        store.add_raw_member("gpu_map:H100:8", "garbage");

        let resolver = HardwareResolver::new(store);
        let filter = HardwareFilter {
            gpu_memory_gb: Some(80),
            interconnect: None,
        };
        let keys = resolver.resolve_instances("H100", 8, &filter).await.unwrap();

        assert_eq!(keys, vec![InstanceKey::new("aws", "us-east-1", "p5.48xlarge")]);
    }

    #[test]
    fn test_find_data_local_instance_takes_first_match() {
        let candidates = vec![
            InstanceKey::new("gcp", "us-central1", "a3-highgpu-8g"),
            InstanceKey::new("aws", "us-east-1", "p5.48xlarge"),
            InstanceKey::new("aws", "us-east-1", "p4d.24xlarge"),
        ];

        let local = find_data_local_instance("aws:s3:us-east-1", &candidates).unwrap();
        assert_eq!(local.instance_type, "p5.48xlarge");
    }

    #[test]
    fn test_find_data_local_instance_errors() {
        let candidates = vec![InstanceKey::new("aws", "us-west-2", "p5.48xlarge")];

        assert!(matches!(
            find_data_local_instance("aws:s3:us-east-1", &candidates),
            Err(EngineError::DataLocalNotFound(_))
        ));
        assert!(matches!(
            find_data_local_instance("aws:s3", &candidates),
            Err(EngineError::Format(_))
        ));
    }
}
