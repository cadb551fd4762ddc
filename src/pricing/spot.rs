//! Spot pricing
//!
//! Spot prices and interruption rates come from a [`SpotMarket`]. Both signals
//! are optional: an unavailable spot price degrades to the on-demand price with
//! a visible notice, and an unavailable interruption rate leaves the risk unset.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::keys::{InstanceKey, Location};
use crate::models::{AnalysisOption, InterruptionRisk};
use crate::pricing::analyzer::{one_time_egress_cost, Omission, OptionOutcome};
use crate::pricing::calculator::compute_break_even;
use crate::store::PriceStore;

pub const SPOT_FALLBACK_NOTICE: &str =
    "(Spot price unavailable, using on-demand. Spot may be cheaper.)";

pub const SPOT_SUFFIX: &str = " (SPOT INSTANCE)";

/// Any reason a spot signal could not be obtained. All variants are
/// handled the same way by the analysis.
#[derive(Debug, Error)]
pub enum SpotError {
    #[error("{0} not implemented")]
    NotImplemented(&'static str),

    #[error("spot market request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("spot market returned HTTP {0}")]
    Status(u16),

    #[error("spot market returned an invalid value: {0}")]
    Decode(String),
}

/// Source of live spot signals for one cloud provider
#[async_trait]
pub trait SpotMarket: Send + Sync {
    /// Provider whose spot market this is (e.g. "aws")
    fn provider(&self) -> &str;

    /// Current spot price per hour
    async fn spot_price(&self, region: &str, instance_type: &str) -> Result<f64, SpotError>;

    /// Interruption rate as a percentage (0-100)
    async fn interruption_rate(&self, region: &str, instance_type: &str)
        -> Result<f64, SpotError>;
}

/// Spot market that never has data. Every analysis falls back to on-demand.
pub struct StubSpotMarket {
    provider: String,
}

impl StubSpotMarket {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
        }
    }
}

#[async_trait]
impl SpotMarket for StubSpotMarket {
    fn provider(&self) -> &str {
        &self.provider
    }

    async fn spot_price(&self, region: &str, instance_type: &str) -> Result<f64, SpotError> {
        debug!("Spot price query for {} in {} (stub)", instance_type, region);
        Err(SpotError::NotImplemented("spot price lookup"))
    }

    async fn interruption_rate(
        &self,
        region: &str,
        instance_type: &str,
    ) -> Result<f64, SpotError> {
        debug!("Interruption rate query for {} in {} (stub)", instance_type, region);
        Err(SpotError::NotImplemented("interruption rate lookup"))
    }
}

#[derive(Debug, Deserialize)]
struct SpotPriceBody {
    spot_price: f64,
}

#[derive(Debug, Deserialize)]
struct InterruptionRateBody {
    interruption_rate: f64,
}

/// Spot market backed by an HTTP pricing service.
///
/// Expects `GET {base_url}/spot-price` and `GET {base_url}/interruption-rate`
/// with `provider`, `region` and `instance_type` query parameters, answering
/// `{"spot_price": f64}` and `{"interruption_rate": f64}` respectively.
pub struct HttpSpotMarket {
    client: reqwest::Client,
    base_url: String,
    provider: String,
}

impl HttpSpotMarket {
    pub fn new(
        base_url: impl Into<String>,
        provider: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SpotError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            provider: provider.into(),
        })
    }

    async fn fetch<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        region: &str,
        instance_type: &str,
    ) -> Result<T, SpotError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("provider", self.provider.as_str()),
                ("region", region),
                ("instance_type", instance_type),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SpotError::Status(response.status().as_u16()));
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl SpotMarket for HttpSpotMarket {
    fn provider(&self) -> &str {
        &self.provider
    }

    async fn spot_price(&self, region: &str, instance_type: &str) -> Result<f64, SpotError> {
        let body: SpotPriceBody = self.fetch("spot-price", region, instance_type).await?;
        if !body.spot_price.is_finite() || body.spot_price < 0.0 {
            return Err(SpotError::Decode(body.spot_price.to_string()));
        }
        Ok(body.spot_price)
    }

    async fn interruption_rate(
        &self,
        region: &str,
        instance_type: &str,
    ) -> Result<f64, SpotError> {
        let body: InterruptionRateBody =
            self.fetch("interruption-rate", region, instance_type).await?;
        if !body.interruption_rate.is_finite() || body.interruption_rate < 0.0 {
            return Err(SpotError::Decode(body.interruption_rate.to_string()));
        }
        Ok(body.interruption_rate)
    }
}

/// Map an interruption percentage to a risk tier: below 5 is LOW,
/// 5 through 15 inclusive is MEDIUM, above 15 is HIGH.
pub fn classify_interruption_rate(rate: f64) -> InterruptionRisk {
    if rate < 5.0 {
        InterruptionRisk::Low
    } else if rate <= 15.0 {
        InterruptionRisk::Medium
    } else {
        InterruptionRisk::High
    }
}

/// Prices spot variants of candidate instances
pub struct SpotAnalyzer {
    store: Arc<dyn PriceStore>,
    market: Arc<dyn SpotMarket>,
}

impl SpotAnalyzer {
    pub fn new(store: Arc<dyn PriceStore>, market: Arc<dyn SpotMarket>) -> Self {
        Self { store, market }
    }

    /// Whether `provider` has a spot market here
    pub fn supports(&self, provider: &str) -> bool {
        self.market.provider() == provider
    }

    pub async fn analyze_spot_option(
        &self,
        key: &InstanceKey,
        source: &Location,
        local_cost_per_hour: f64,
        data_size_gb: f64,
        on_demand_cost_per_hour: f64,
    ) -> OptionOutcome {
        if !self.supports(&key.provider) {
            return OptionOutcome::Omitted(Omission::NotApplicable {
                reason: format!("no spot market for provider {}", key.provider),
            });
        }

        let (cost_per_hour, fell_back) =
            match self.market.spot_price(&key.region, &key.instance_type).await {
                Ok(price) => (price, false),
                Err(e) => {
                    warn!(key = %key, "Spot price unavailable, using on-demand price: {}", e);
                    crate::metrics::record_spot_fallback();
                    (on_demand_cost_per_hour, true)
                }
            };

        let interruption_risk = match self
            .market
            .interruption_rate(&key.region, &key.instance_type)
            .await
        {
            Ok(rate) => Some(classify_interruption_rate(rate)),
            Err(e) => {
                info!(key = %key, "Interruption rate unavailable: {}", e);
                None
            }
        };

        let egress_cost =
            match one_time_egress_cost(self.store.as_ref(), source, key, data_size_gb).await {
                Ok(cost) => cost,
                Err(outcome) => return outcome,
            };

        let break_even = compute_break_even(local_cost_per_hour, cost_per_hour, egress_cost);
        let advisory_message = if fell_back {
            format!("{} {}", SPOT_FALLBACK_NOTICE, break_even.advisory)
        } else {
            break_even.advisory
        };

        OptionOutcome::Produced(AnalysisOption {
            provider: key.provider.clone(),
            region: key.region.clone(),
            instance_type: format!("{}{}", key.instance_type, SPOT_SUFFIX),
            compute_cost_per_hour: cost_per_hour,
            one_time_egress_cost: egress_cost,
            break_even_hours: break_even.hours,
            advisory_message,
            is_spot_instance: true,
            interruption_risk,
        })
    }
}
