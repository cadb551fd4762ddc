use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use tracing::warn;

use crate::server::AppState;

/// Health check endpoint
/// Returns 200 OK if the service is running
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({
        "status": "healthy",
        "service": "cost-engine",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

/// Readiness check endpoint
/// Returns 503 while the price store is unreachable
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({
            "status": "ready",
            "service": "cost-engine",
        }))),
        Err(e) => {
            warn!("Readiness check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, Json(json!({
                "status": "unavailable",
                "service": "cost-engine",
                "error": e.to_string(),
            })))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::InstanceKey;
    use crate::pricing::models::{ComputePrice, EgressPrice};
    use crate::pricing::{CostEngine, StubSpotMarket};
    use crate::store::{PriceStore, StoreError};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct UnreachableStore;

    #[async_trait]
    impl PriceStore for UnreachableStore {
        async fn instances_for_gpu(&self, _: &str, _: u32) -> Result<Vec<String>, StoreError> {
            Err(StoreError::Connection("connection refused".to_string()))
        }

        async fn compute_price(&self, _: &InstanceKey) -> Result<Option<ComputePrice>, StoreError> {
            Err(StoreError::Connection("connection refused".to_string()))
        }

        async fn egress_price(&self, _: &str) -> Result<Option<EgressPrice>, StoreError> {
            Err(StoreError::Connection("connection refused".to_string()))
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Err(StoreError::Connection("connection refused".to_string()))
        }
    }

    fn state(store: Arc<dyn PriceStore>) -> AppState {
        AppState {
            engine: Arc::new(CostEngine::new(store.clone(), Arc::new(StubSpotMarket::new("aws")))),
            store,
        }
    }

    #[tokio::test]
    async fn test_health_check_returns_ok() {
        let response = health_check().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readiness_check_returns_ok() {
        let store = Arc::new(crate::store::MemoryPriceStore::new());
        let response = readiness_check(State(state(store))).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readiness_check_store_down() {
        let response = readiness_check(State(state(Arc::new(UnreachableStore))))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
