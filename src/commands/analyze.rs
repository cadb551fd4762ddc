use anyhow::{Context, Result};
use colored::Colorize;
use cost_engine::client::{load_job, ApiClient};
use cost_engine::report;
use std::path::Path;
use tracing::info;

/// Execute the analyze command
///
/// Reads a job file, submits it to the API and prints the report
pub async fn execute(file: &Path, api_url: &str) -> Result<()> {
    let job = load_job(file).with_context(|| format!("Invalid job file {}", file.display()))?;

    println!(
        "{} {} ({}x {}, {} GB at {})",
        "Analyzing".yellow(),
        job.job_name,
        job.compute.gpu_count,
        job.compute.gpu_type,
        job.data.size_gb,
        job.data.location
    );
    info!("Submitting job {} to {}", job.job_name, api_url);

    let client = ApiClient::new(api_url)?;
    let response = client
        .analyze(&job)
        .await
        .with_context(|| format!("Analysis request to {} failed", api_url))?;

    println!();
    print!("{}", report::render(&job.job_name, &response));
    Ok(())
}
