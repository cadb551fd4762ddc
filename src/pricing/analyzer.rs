//! Per-candidate on-demand option analysis
//!
//! compute price + egress route price -> break-even against the data-local rate

use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::keys::{compute_key, egress_route_key, InstanceKey, Location};
use crate::models::AnalysisOption;
use crate::pricing::calculator::compute_break_even;
use crate::store::{PriceStore, StoreError};

/// Which pricing record was missing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingKind {
    Compute,
    Egress,
}

impl MissingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compute => "compute",
            Self::Egress => "egress",
        }
    }
}

impl fmt::Display for MissingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an option was left out of the result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Omission {
    /// A pricing record does not exist
    MissingKey { kind: MissingKind, key: String },
    /// The analysis does not apply to this instance (e.g. no spot market)
    NotApplicable { reason: String },
}

/// Result of analyzing a single candidate
#[derive(Debug)]
pub enum OptionOutcome {
    /// A complete option row
    Produced(AnalysisOption),
    /// Dropped silently; logged but never surfaced to the caller
    Omitted(Omission),
    /// A lookup failed; the candidate is dropped but the failure is reported
    Failed(StoreError),
}

impl OptionOutcome {
    pub fn into_option(self) -> Option<AnalysisOption> {
        match self {
            Self::Produced(option) => Some(option),
            _ => None,
        }
    }

    pub(crate) fn missing(kind: MissingKind, key: String) -> Self {
        warn!(
            kind = kind.as_str(),
            key = %key,
            "Missing {} key: {} (silently omitting from results)",
            kind,
            key
        );
        Self::omitted(kind, key)
    }

    /// Same as `missing`, for a record an earlier pass already warned about
    pub(crate) fn missing_again(kind: MissingKind, key: String) -> Self {
        debug!(
            kind = kind.as_str(),
            key = %key,
            "Missing {} key: {} (already reported)",
            kind,
            key
        );
        Self::omitted(kind, key)
    }

    fn omitted(kind: MissingKind, key: String) -> Self {
        crate::metrics::record_omission(kind.as_str());
        Self::Omitted(Omission::MissingKey { kind, key })
    }
}

/// One-time cost of moving the data to `dest`.
///
/// Shared by the on-demand and spot analyses. A missing route price or a
/// failed lookup comes back as the outcome the caller should return.
pub(crate) async fn one_time_egress_cost(
    store: &dyn PriceStore,
    source: &Location,
    dest: &InstanceKey,
    data_size_gb: f64,
) -> Result<f64, OptionOutcome> {
    let route = egress_route_key(source, &dest.provider, &dest.region);
    match store.egress_price(&route).await {
        Ok(Some(price)) => Ok(price.cost_per_gb * data_size_gb),
        Ok(None) => Err(OptionOutcome::missing(MissingKind::Egress, route)),
        Err(e) => Err(OptionOutcome::Failed(e)),
    }
}

/// Prices a remote on-demand option against the data-local baseline
pub struct OptionAnalyzer {
    store: Arc<dyn PriceStore>,
}

impl OptionAnalyzer {
    pub fn new(store: Arc<dyn PriceStore>) -> Self {
        Self { store }
    }

    pub async fn analyze_option(
        &self,
        key: &InstanceKey,
        source: &Location,
        local_cost_per_hour: f64,
        data_size_gb: f64,
    ) -> OptionOutcome {
        let price = match self.store.compute_price(key).await {
            Ok(Some(price)) => price,
            Ok(None) => return OptionOutcome::missing(MissingKind::Compute, compute_key(key)),
            Err(e) => return OptionOutcome::Failed(e),
        };

        let egress_cost =
            match one_time_egress_cost(self.store.as_ref(), source, key, data_size_gb).await {
                Ok(cost) => cost,
                Err(outcome) => return outcome,
            };

        let break_even = compute_break_even(local_cost_per_hour, price.cost_per_hour, egress_cost);

        OptionOutcome::Produced(AnalysisOption {
            provider: key.provider.clone(),
            region: key.region.clone(),
            instance_type: key.instance_type.clone(),
            compute_cost_per_hour: price.cost_per_hour,
            one_time_egress_cost: egress_cost,
            break_even_hours: break_even.hours,
            advisory_message: break_even.advisory,
            is_spot_instance: false,
            interruption_risk: None,
        })
    }
}
