pub mod job;

pub use job::{
    AnalysisOption, AnalysisResponse, InterruptionRisk, JobCompute, JobData, JobOutput,
    JobRequest,
};
