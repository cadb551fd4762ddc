use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::{debug, info};

use super::{PriceSink, PriceStore, StoreError};
use crate::keys::{compute_key, gpu_map_key, InstanceKey};
use crate::pricing::models::{ComputePrice, EgressPrice};

/// Redis-backed price store.
///
/// Holds a single [`ConnectionManager`]; each call works on a clone of it,
/// so concurrent requests multiplex over one connection without locking.
#[derive(Clone)]
pub struct RedisPriceStore {
    conn: ConnectionManager,
}

impl RedisPriceStore {
    /// Connect and verify the connection with a PING
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client =
            redis::Client::open(url).map_err(|e| StoreError::Connection(e.to_string()))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let store = Self { conn };
        store.ping().await?;
        info!("Connected to Redis at {}", url);
        Ok(store)
    }

    /// Release the connection. Dropping the last clone closes it.
    pub fn close(self) {
        debug!("Closing Redis price store");
        drop(self.conn);
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<T>, StoreError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(key).await.map_err(|e| command_error(key, e))?;

        match raw {
            Some(s) => serde_json::from_str(&s)
                .map(Some)
                .map_err(|e| StoreError::decode(key, e)),
            None => Ok(None),
        }
    }

    async fn set_json<T: serde::Serialize + Sync>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(value).map_err(|e| StoreError::decode(key, e))?;
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(key, encoded)
            .await
            .map_err(|e| command_error(key, e))?;
        Ok(())
    }
}

fn command_error(key: &str, err: redis::RedisError) -> StoreError {
    StoreError::Command {
        key: key.to_string(),
        message: err.to_string(),
    }
}

#[async_trait]
impl PriceStore for RedisPriceStore {
    async fn instances_for_gpu(
        &self,
        gpu_type: &str,
        gpu_count: u32,
    ) -> Result<Vec<String>, StoreError> {
        let key = gpu_map_key(gpu_type, gpu_count);
        let mut conn = self.conn.clone();
        // SMEMBERS on a missing key is an empty set
        let members: Vec<String> = conn
            .smembers(&key)
            .await
            .map_err(|e| command_error(&key, e))?;
        debug!("Resolved {} members from {}", members.len(), key);
        Ok(members)
    }

    async fn compute_price(&self, key: &InstanceKey) -> Result<Option<ComputePrice>, StoreError> {
        self.get_json(&compute_key(key)).await
    }

    async fn egress_price(&self, route_key: &str) -> Result<Option<EgressPrice>, StoreError> {
        self.get_json(route_key).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl PriceSink for RedisPriceStore {
    async fn add_instance_to_gpu_map(
        &self,
        gpu_type: &str,
        gpu_count: u32,
        key: &InstanceKey,
    ) -> Result<(), StoreError> {
        let map_key = gpu_map_key(gpu_type, gpu_count);
        let mut conn = self.conn.clone();
        conn.sadd::<_, _, ()>(&map_key, key.to_string())
            .await
            .map_err(|e| command_error(&map_key, e))?;
        debug!("Added {} to {}", key, map_key);
        Ok(())
    }

    async fn set_compute_price(&self, price: &ComputePrice) -> Result<(), StoreError> {
        let key = compute_key(&price.instance_key());
        self.set_json(&key, price).await?;
        debug!("Set compute price for {}", key);
        Ok(())
    }

    async fn set_egress_price(
        &self,
        route_key: &str,
        price: &EgressPrice,
    ) -> Result<(), StoreError> {
        self.set_json(route_key, price).await?;
        debug!("Set egress price for {}", route_key);
        Ok(())
    }
}
