use serde::{Deserialize, Serialize};

/// Data location and size
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobData {
    /// Format: provider:service:region (e.g. "aws:s3:us-east-1")
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub size_gb: f64,
}

/// Compute requirements
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobCompute {
    /// e.g. "H100"
    #[serde(default)]
    pub gpu_type: String,
    #[serde(default)]
    pub gpu_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpu_memory_gb: Option<u32>,
    /// e.g. "infiniband"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interconnect: Option<String>,
}

/// Output location. Accepted on the wire, not used by the analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobOutput {
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub path: String,
}

/// Incoming analysis request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobRequest {
    #[serde(default)]
    pub job_name: String,
    #[serde(default)]
    pub data: JobData,
    #[serde(default)]
    pub compute: JobCompute,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<JobOutput>,
}

impl JobRequest {
    /// Names of required fields that are missing or out of range
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.job_name.trim().is_empty() {
            missing.push("job_name");
        }
        if self.data.location.trim().is_empty() {
            missing.push("data.location");
        }
        if !self.data.size_gb.is_finite() || self.data.size_gb <= 0.0 {
            missing.push("data.size_gb");
        }
        if self.compute.gpu_type.trim().is_empty() {
            missing.push("compute.gpu_type");
        }
        if self.compute.gpu_count == 0 {
            missing.push("compute.gpu_count");
        }
        missing
    }

    /// Reject requests missing any required field
    pub fn validate(&self) -> Result<(), String> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(format!("Missing required fields: {}", missing.join(", ")))
        }
    }
}

/// Interruption risk tier for spot capacity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InterruptionRisk {
    Low,
    Medium,
    High,
}

impl InterruptionRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

impl std::fmt::Display for InterruptionRisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the analysis result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOption {
    pub provider: String,
    pub region: String,
    pub instance_type: String,
    pub compute_cost_per_hour: f64,
    pub one_time_egress_cost: f64,
    /// `None` whenever the remote cost is not strictly lower than the local cost
    pub break_even_hours: Option<f64>,
    pub advisory_message: String,
    pub is_spot_instance: bool,
    pub interruption_risk: Option<InterruptionRisk>,
}

/// Complete analysis result.
///
/// `remote_options` follows candidate resolution order with spot variants
/// appended after the on-demand options. The candidate order comes from the
/// store's set iteration order, which Redis does not define, so two identical
/// requests may list options in a different order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub data_local_option: AnalysisOption,
    pub remote_options: Vec<AnalysisOption>,
}
