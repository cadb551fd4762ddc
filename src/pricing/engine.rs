//! Analysis orchestration
//!
//! resolve candidates -> data-local baseline -> on-demand options -> spot options

use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::keys::{compute_key, parse_location, InstanceKey, Location};
use crate::models::{AnalysisOption, AnalysisResponse, JobRequest};
use crate::pricing::analyzer::{MissingKind, Omission, OptionAnalyzer, OptionOutcome};
use crate::pricing::calculator::ADVISORY_DATA_LOCAL;
use crate::pricing::resolver::{find_data_local_instance, HardwareFilter, HardwareResolver};
use crate::pricing::spot::{SpotAnalyzer, SpotMarket};
use crate::store::PriceStore;

/// Compares every candidate instance for a job against its data-local option
pub struct CostEngine {
    store: Arc<dyn PriceStore>,
    resolver: HardwareResolver,
    analyzer: OptionAnalyzer,
    spot: SpotAnalyzer,
}

impl CostEngine {
    pub fn new(store: Arc<dyn PriceStore>, market: Arc<dyn SpotMarket>) -> Self {
        Self {
            resolver: HardwareResolver::new(store.clone()),
            analyzer: OptionAnalyzer::new(store.clone()),
            spot: SpotAnalyzer::new(store.clone(), market),
            store,
        }
    }

    /// Run the full analysis for one job.
    ///
    /// Fails only when no candidate matches the GPU requirement or the
    /// data-local baseline cannot be established. Everything else degrades
    /// the option list.
    pub async fn analyze_job(&self, job: &JobRequest) -> Result<AnalysisResponse, EngineError> {
        let filter = HardwareFilter {
            gpu_memory_gb: job.compute.gpu_memory_gb,
            interconnect: job.compute.interconnect.clone(),
        };

        let candidates = self
            .resolver
            .resolve_instances(&job.compute.gpu_type, job.compute.gpu_count, &filter)
            .await?;

        if candidates.is_empty() {
            return Err(EngineError::NoCandidates {
                gpu_type: job.compute.gpu_type.clone(),
                gpu_count: job.compute.gpu_count,
            });
        }
        debug!(
            job = %job.job_name,
            "Resolved {} candidate instances for {}x {}",
            candidates.len(),
            job.compute.gpu_count,
            job.compute.gpu_type
        );

        let local_key = find_data_local_instance(&job.data.location, &candidates)?;
        let source = parse_location(&job.data.location)?;

        let local_price = self
            .store
            .compute_price(&local_key)
            .await?
            .ok_or_else(|| EngineError::DataLocalPriceMissing(compute_key(&local_key)))?;

        let data_local_option = AnalysisOption {
            provider: local_key.provider.clone(),
            region: local_key.region.clone(),
            instance_type: local_key.instance_type.clone(),
            compute_cost_per_hour: local_price.cost_per_hour,
            one_time_egress_cost: 0.0,
            break_even_hours: None,
            advisory_message: ADVISORY_DATA_LOCAL.to_string(),
            is_spot_instance: false,
            interruption_risk: None,
        };

        let local_cost = local_price.cost_per_hour;
        let data_size_gb = job.data.size_gb;

        let on_demand = join_all(
            candidates
                .iter()
                .filter(|key| **key != local_key)
                .map(|key| self.analyzer.analyze_option(key, &source, local_cost, data_size_gb)),
        )
        .await;

        let spot = join_all(
            candidates
                .iter()
                .filter(|key| self.spot.supports(&key.provider))
                .map(|key| self.spot_outcome(key, &source, local_cost, data_size_gb)),
        )
        .await;

        let mut remote_options = Vec::with_capacity(on_demand.len() + spot.len());
        let mut omitted = 0usize;
        for outcome in on_demand.into_iter().chain(spot) {
            match outcome {
                OptionOutcome::Produced(option) => remote_options.push(option),
                OptionOutcome::Omitted(Omission::NotApplicable { reason }) => {
                    debug!("Option not applicable: {}", reason);
                }
                OptionOutcome::Omitted(Omission::MissingKey { .. }) => omitted += 1,
                OptionOutcome::Failed(e) => {
                    warn!("Price lookup failed, dropping option: {}", e);
                    crate::metrics::record_omission("failed");
                    omitted += 1;
                }
            }
        }

        info!(
            job = %job.job_name,
            data_local = %local_key,
            remote_options = remote_options.len(),
            omitted,
            "Analysis complete"
        );

        Ok(AnalysisResponse {
            data_local_option,
            remote_options,
        })
    }

    /// Spot variant of `key`, priced against its own on-demand rate.
    ///
    /// A missing compute record was already reported by the on-demand pass.
    async fn spot_outcome(
        &self,
        key: &InstanceKey,
        source: &Location,
        local_cost: f64,
        data_size_gb: f64,
    ) -> OptionOutcome {
        let on_demand = match self.store.compute_price(key).await {
            Ok(Some(price)) => price.cost_per_hour,
            Ok(None) => {
                return OptionOutcome::missing_again(MissingKind::Compute, compute_key(key))
            }
            Err(e) => return OptionOutcome::Failed(e),
        };

        self.spot
            .analyze_spot_option(key, source, local_cost, data_size_gb, on_demand)
            .await
    }
}
