//! Cost analysis core
//!
//! Resolves GPU requirements to candidate instances and prices each one
//! against the data-local option.

pub mod analyzer;
pub mod calculator;
pub mod engine;
pub mod models;
pub mod resolver;
pub mod spot;

pub use analyzer::{MissingKind, Omission, OptionAnalyzer, OptionOutcome};
pub use calculator::{compute_break_even, BreakEven};
pub use engine::CostEngine;
pub use models::{ComputePrice, EgressPrice};
pub use resolver::{find_data_local_instance, HardwareFilter, HardwareResolver};
pub use spot::{
    classify_interruption_rate, HttpSpotMarket, SpotAnalyzer, SpotError, SpotMarket,
    StubSpotMarket,
};
