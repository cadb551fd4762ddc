//! HTTP client for a running cost engine

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::models::{AnalysisResponse, JobRequest};

pub const DEFAULT_API_URL: &str = "http://localhost:8080";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to read job file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse job file: {0}")]
    Parse(String),

    #[error("invalid job: {0}")]
    InvalidJob(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Read a job description (`.toml` or `.json`) and check its required fields
pub fn load_job(path: &Path) -> Result<JobRequest, ClientError> {
    let content = std::fs::read_to_string(path)?;
    let job: JobRequest = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => {
            serde_json::from_str(&content).map_err(|e| ClientError::Parse(e.to_string()))?
        }
        _ => toml::from_str(&content).map_err(|e| ClientError::Parse(e.to_string()))?,
    };

    job.validate().map_err(ClientError::InvalidJob)?;
    Ok(job)
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// POST the job to `/analyze`
    pub async fn analyze(&self, job: &JobRequest) -> Result<AnalysisResponse, ClientError> {
        let url = format!("{}/analyze", self.base_url);
        debug!("POST {}", url);

        let response = self.http.post(&url).json(job).send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.error.message)
                .unwrap_or(text);
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}
