use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::time::Instant;
use tracing::{info, warn, Instrument};

use crate::error::{error_type_name, AppError};
use crate::metrics;
use crate::models::{AnalysisResponse, JobRequest};
use crate::server::AppState;

/// Handle /analyze and /api/v1/analyze
///
/// Malformed bodies and missing required fields are rejected with 400
/// before the engine is involved.
pub async fn analyze_job(
    State(state): State<AppState>,
    payload: Result<Json<JobRequest>, JsonRejection>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let start = Instant::now();
    let result = run(state, payload).await;

    metrics::record_duration(start.elapsed());
    match &result {
        Ok(_) => metrics::record_request("ok"),
        Err(e) => metrics::record_request(error_type_name(e)),
    }

    result
}

async fn run(
    state: AppState,
    payload: Result<Json<JobRequest>, JsonRejection>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let Json(job) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    if let Err(message) = job.validate() {
        warn!(job = %job.job_name, "Rejected analysis request: {}", message);
        return Err(AppError::BadRequest(message));
    }

    let request_id = uuid::Uuid::new_v4().to_string();
    let span = tracing::info_span!(
        "analyze",
        request_id = %request_id,
        job = %job.job_name,
        gpu_type = %job.compute.gpu_type,
        gpu_count = job.compute.gpu_count,
    );

    async move {
        info!(
            location = %job.data.location,
            size_gb = job.data.size_gb,
            "Analyzing job"
        );

        let response = state.engine.analyze_job(&job).await.map_err(|e| {
            warn!(kind = e.kind(), "Analysis failed: {}", e);
            AppError::from(e)
        })?;

        Ok::<_, AppError>(Json(response))
    }
    .instrument(span)
    .await
}
