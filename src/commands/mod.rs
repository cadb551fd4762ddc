//! Command implementations for the CLI
//!
//! - serve: Start the analysis server
//! - analyze: Submit a job file and print the report
//! - seed: Load prices into Redis
//! - test: Test configuration validity
//! - config: Configuration display and validation

pub mod analyze;
pub mod config;
pub mod seed;
pub mod serve;
