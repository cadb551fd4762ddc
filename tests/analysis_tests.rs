/// End-to-end analysis against a seeded in-memory price store
use std::sync::Arc;

use cost_engine::{
    error::EngineError,
    models::{InterruptionRisk, JobCompute, JobData, JobRequest},
    pricing::{spot::SPOT_FALLBACK_NOTICE, CostEngine, SpotError, SpotMarket, StubSpotMarket},
    seed::{apply_seed, SeedDocument},
    store::MemoryPriceStore,
};

const PRICES: &str = r#"
[[compute]]
provider = "aws"
region = "us-east-1"
instance_type = "p5.48xlarge"
gpu_type = "H100"
gpu_count = 8
cost_per_hour = 98.32
gpu_memory_gb = 80
interconnect = "efa"

[[compute]]
provider = "aws"
region = "us-west-2"
instance_type = "p5.48xlarge"
gpu_type = "H100"
gpu_count = 8
cost_per_hour = 90.00
gpu_memory_gb = 80
interconnect = "efa"

[[compute]]
provider = "gcp"
region = "us-central1"
instance_type = "a3-highgpu-8g"
gpu_type = "H100"
gpu_count = 8
cost_per_hour = 88.25
gpu_memory_gb = 80
interconnect = "gpudirect-tcpx"

[[compute]]
provider = "lambda"
region = "us-tx-1"
instance_type = "gpu_8x_h100_sxm5"
gpu_type = "H100"
gpu_count = 8
cost_per_hour = 23.92

[[compute]]
provider = "azure"
region = "eastus"
instance_type = "Standard_ND96isr_H100_v5"
gpu_type = "H100"
gpu_count = 8
cost_per_hour = 105.0
gpu_memory_gb = 80
interconnect = "infiniband"

[[egress]]
source = "aws:s3:us-east-1"
dest_provider = "aws"
dest_region = "us-east-1"
cost_per_gb = 0.0

[[egress]]
source = "aws:s3:us-east-1"
dest_provider = "aws"
dest_region = "us-west-2"
cost_per_gb = 0.02

[[egress]]
source = "aws:s3:us-east-1"
cost_per_gb = 0.09
"#;

async fn seeded_store() -> Arc<MemoryPriceStore> {
    let store = Arc::new(MemoryPriceStore::new());
    let doc = SeedDocument::from_toml(PRICES).unwrap();
    apply_seed(store.as_ref(), &doc).await.unwrap();
    store
}

fn h100_job() -> JobRequest {
    JobRequest {
        job_name: "llama-70b-finetune".to_string(),
        data: JobData {
            location: "aws:s3:us-east-1".to_string(),
            size_gb: 500.0,
        },
        compute: JobCompute {
            gpu_type: "H100".to_string(),
            gpu_count: 8,
            gpu_memory_gb: None,
            interconnect: None,
        },
        output: None,
    }
}

/// Spot market with live prices for one SKU only
struct PartialSpotMarket;

#[async_trait::async_trait]
impl SpotMarket for PartialSpotMarket {
    fn provider(&self) -> &str {
        "aws"
    }

    async fn spot_price(&self, region: &str, _instance_type: &str) -> Result<f64, SpotError> {
        match region {
            "us-west-2" => Ok(31.5),
            _ => Err(SpotError::Status(503)),
        }
    }

    async fn interruption_rate(
        &self,
        region: &str,
        _instance_type: &str,
    ) -> Result<f64, SpotError> {
        match region {
            "us-west-2" => Ok(18.0),
            _ => Err(SpotError::NotImplemented("interruption rate lookup")),
        }
    }
}

#[tokio::test]
async fn test_full_analysis_with_stub_spot_market() {
    let store = seeded_store().await;
    let engine = CostEngine::new(store, Arc::new(StubSpotMarket::new("aws")));

    let response = engine.analyze_job(&h100_job()).await.unwrap();

    let local = &response.data_local_option;
    assert_eq!(local.provider, "aws");
    assert_eq!(local.region, "us-east-1");
    assert_eq!(local.compute_cost_per_hour, 98.32);
    assert_eq!(local.one_time_egress_cost, 0.0);
    assert_eq!(local.break_even_hours, None);
    assert!(!local.is_spot_instance);

    let on_demand: Vec<_> = response
        .remote_options
        .iter()
        .filter(|o| !o.is_spot_instance)
        .collect();
    // every other cloud shares the flat internet route
    assert_eq!(on_demand.len(), 4);

    let gcp = on_demand.iter().find(|o| o.provider == "gcp").unwrap();
    assert!((gcp.one_time_egress_cost - 45.0).abs() < 1e-9);
    assert_eq!(gcp.break_even_hours, Some(4.5));

    let azure = on_demand.iter().find(|o| o.provider == "azure").unwrap();
    assert_eq!(azure.break_even_hours, None);
    assert!(azure.advisory_message.starts_with("Not recommended"));

    let spot: Vec<_> = response
        .remote_options
        .iter()
        .filter(|o| o.is_spot_instance)
        .collect();
    assert_eq!(spot.len(), 2);
    for option in spot {
        assert_eq!(option.provider, "aws");
        assert!(option.instance_type.ends_with(" (SPOT INSTANCE)"));
        assert!(option.advisory_message.starts_with(SPOT_FALLBACK_NOTICE));
        assert_eq!(option.interruption_risk, None);
    }
}

#[tokio::test]
async fn test_missing_candidate_price_is_silently_omitted() {
    let store = seeded_store().await;
    store.add_raw_member("gpu_map:H100:8", "oci:us-ashburn-1:BM.GPU.H100.8");
    let engine = CostEngine::new(store, Arc::new(StubSpotMarket::new("aws")));

    let response = engine.analyze_job(&h100_job()).await.unwrap();

    assert!(response
        .remote_options
        .iter()
        .all(|o| o.provider != "oci"));
    assert_ne!(response.data_local_option.provider, "oci");
}

#[tokio::test]
async fn test_missing_egress_route_omits_option() {
    let store = seeded_store().await;
    store.remove("egress:aws:s3:us-east-1:aws:us-west-2");
    let engine = CostEngine::new(store, Arc::new(StubSpotMarket::new("aws")));

    let response = engine.analyze_job(&h100_job()).await.unwrap();

    assert!(response
        .remote_options
        .iter()
        .all(|o| o.region != "us-west-2"));
}

#[tokio::test]
async fn test_memory_filter_excludes_records_without_memory() {
    let store = seeded_store().await;
    let engine = CostEngine::new(store, Arc::new(StubSpotMarket::new("none")));

    let mut job = h100_job();
    job.compute.gpu_memory_gb = Some(80);
    let response = engine.analyze_job(&job).await.unwrap();

    assert!(response
        .remote_options
        .iter()
        .all(|o| o.provider != "lambda"));
    assert_eq!(response.remote_options.len(), 3);
}

#[tokio::test]
async fn test_interconnect_filter_can_remove_data_local_baseline() {
    let store = seeded_store().await;
    let engine = CostEngine::new(store, Arc::new(StubSpotMarket::new("aws")));

    let mut job = h100_job();
    job.compute.interconnect = Some("infiniband".to_string());
    let err = engine.analyze_job(&job).await.unwrap_err();

    assert!(matches!(err, EngineError::DataLocalNotFound(_)));
}

#[tokio::test]
async fn test_unknown_gpu_count_has_no_candidates() {
    let store = seeded_store().await;
    let engine = CostEngine::new(store, Arc::new(StubSpotMarket::new("aws")));

    let mut job = h100_job();
    job.compute.gpu_count = 4;
    let err = engine.analyze_job(&job).await.unwrap_err();

    assert!(matches!(err, EngineError::NoCandidates { gpu_count: 4, .. }));
}

#[tokio::test]
async fn test_live_spot_prices_mixed_with_fallback() {
    let store = seeded_store().await;
    let engine = CostEngine::new(store, Arc::new(PartialSpotMarket));

    let response = engine.analyze_job(&h100_job()).await.unwrap();

    let west = response
        .remote_options
        .iter()
        .find(|o| o.is_spot_instance && o.region == "us-west-2")
        .unwrap();
    assert_eq!(west.compute_cost_per_hour, 31.5);
    assert_eq!(west.interruption_risk, Some(InterruptionRisk::High));
    assert!(!west.advisory_message.contains("Spot price unavailable"));
    // 10 / (98.32 - 31.5) = 0.149...
    assert_eq!(west.break_even_hours, Some(0.1));

    let east = response
        .remote_options
        .iter()
        .find(|o| o.is_spot_instance && o.region == "us-east-1")
        .unwrap();
    assert_eq!(east.compute_cost_per_hour, 98.32);
    assert!(east.advisory_message.starts_with(SPOT_FALLBACK_NOTICE));
    assert_eq!(east.interruption_risk, None);
}
