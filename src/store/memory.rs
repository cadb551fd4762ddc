use async_trait::async_trait;
use dashmap::DashMap;

use super::{PriceSink, PriceStore, StoreError};
use crate::keys::{compute_key, gpu_map_key, InstanceKey};
use crate::pricing::models::{ComputePrice, EgressPrice};

/// In-process price store with the same key layout as Redis.
///
/// Scalar values are kept as JSON text so malformed records behave exactly
/// as they would when read from Redis. Sets keep insertion order.
#[derive(Debug, Default)]
pub struct MemoryPriceStore {
    values: DashMap<String, String>,
    sets: DashMap<String, Vec<String>>,
}

impl MemoryPriceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw value under `key`, bypassing encoding
    pub fn insert_raw(&self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Add a raw member to a set, ignoring duplicates
    pub fn add_raw_member(&self, set_key: impl Into<String>, member: impl Into<String>) {
        let member = member.into();
        let mut entry = self.sets.entry(set_key.into()).or_default();
        if !entry.contains(&member) {
            entry.push(member);
        }
    }

    pub fn remove(&self, key: &str) {
        self.values.remove(key);
    }

    pub fn len(&self) -> usize {
        self.values.len() + self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.values.get(key) {
            Some(raw) => serde_json::from_str(raw.value())
                .map(Some)
                .map_err(|e| StoreError::decode(key, e)),
            None => Ok(None),
        }
    }

    fn set_json<T: serde::Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(value).map_err(|e| StoreError::decode(key, e))?;
        self.values.insert(key.to_string(), encoded);
        Ok(())
    }
}

#[async_trait]
impl PriceStore for MemoryPriceStore {
    async fn instances_for_gpu(
        &self,
        gpu_type: &str,
        gpu_count: u32,
    ) -> Result<Vec<String>, StoreError> {
        Ok(self
            .sets
            .get(&gpu_map_key(gpu_type, gpu_count))
            .map(|members| members.value().clone())
            .unwrap_or_default())
    }

    async fn compute_price(&self, key: &InstanceKey) -> Result<Option<ComputePrice>, StoreError> {
        self.get_json(&compute_key(key))
    }

    async fn egress_price(&self, route_key: &str) -> Result<Option<EgressPrice>, StoreError> {
        self.get_json(route_key)
    }
}

#[async_trait]
impl PriceSink for MemoryPriceStore {
    async fn add_instance_to_gpu_map(
        &self,
        gpu_type: &str,
        gpu_count: u32,
        key: &InstanceKey,
    ) -> Result<(), StoreError> {
        self.add_raw_member(gpu_map_key(gpu_type, gpu_count), key.to_string());
        Ok(())
    }

    async fn set_compute_price(&self, price: &ComputePrice) -> Result<(), StoreError> {
        self.set_json(&compute_key(&price.instance_key()), price)
    }

    async fn set_egress_price(
        &self,
        route_key: &str,
        price: &EgressPrice,
    ) -> Result<(), StoreError> {
        self.set_json(route_key, price)
    }
}
