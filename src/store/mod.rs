//! Price store
//!
//! The analysis only reads prices. Readers go through [`PriceStore`], which
//! distinguishes "not found" (`Ok(None)` / empty set) from transport or
//! decoding failures. Ingestion goes through [`PriceSink`].

pub mod memory;
pub mod redis_store;

use async_trait::async_trait;
use thiserror::Error;

use crate::keys::InstanceKey;
use crate::pricing::models::{ComputePrice, EgressPrice};

pub use self::memory::MemoryPriceStore;
pub use self::redis_store::RedisPriceStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store connection error: {0}")]
    Connection(String),

    #[error("store command failed for {key}: {message}")]
    Command { key: String, message: String },

    #[error("malformed value at {key}: {message}")]
    Decode { key: String, message: String },
}

impl StoreError {
    pub fn decode(key: &str, err: serde_json::Error) -> Self {
        Self::Decode {
            key: key.to_string(),
            message: err.to_string(),
        }
    }
}

/// Read access to pricing data
#[async_trait]
pub trait PriceStore: Send + Sync {
    /// Raw instance keys grouped under a GPU type and exact GPU count.
    /// A missing group is an empty list.
    async fn instances_for_gpu(
        &self,
        gpu_type: &str,
        gpu_count: u32,
    ) -> Result<Vec<String>, StoreError>;

    async fn compute_price(&self, key: &InstanceKey) -> Result<Option<ComputePrice>, StoreError>;

    async fn egress_price(&self, route_key: &str) -> Result<Option<EgressPrice>, StoreError>;

    /// Connectivity probe used by the readiness endpoint
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Write access used by price ingestion
#[async_trait]
pub trait PriceSink: Send + Sync {
    async fn add_instance_to_gpu_map(
        &self,
        gpu_type: &str,
        gpu_count: u32,
        key: &InstanceKey,
    ) -> Result<(), StoreError>;

    async fn set_compute_price(&self, price: &ComputePrice) -> Result<(), StoreError>;

    async fn set_egress_price(&self, route_key: &str, price: &EgressPrice)
        -> Result<(), StoreError>;
}
