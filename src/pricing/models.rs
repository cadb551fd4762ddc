use serde::{Deserialize, Serialize};

use crate::keys::InstanceKey;

/// Hourly price and hardware attributes of a compute SKU, stored as JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputePrice {
    pub provider: String,
    pub region: String,
    pub instance_type: String,
    pub cost_per_hour: f64,
    pub gpu_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpu_memory_gb: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interconnect: Option<String>,
}

impl ComputePrice {
    /// Instance key this record is stored under
    pub fn instance_key(&self) -> InstanceKey {
        InstanceKey::new(&self.provider, &self.region, &self.instance_type)
    }
}

/// Per-GB price of a directional egress route, stored as JSON
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EgressPrice {
    pub cost_per_gb: f64,
}
